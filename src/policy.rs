//! Access Policy
//!
//! Pure decision functions: caller + target scope in, bool out. No I/O, no
//! side effects, never errors — callers translate `false` into a Forbidden
//! at the boundary.
//!
//! The scope rule fails closed: a `teacher`/`admin` without a resolvable
//! home district is denied, not waved through.

use uuid::Uuid;

use crate::models::{Caller, Role};

/// Can the caller read/modify resources owned by `target_district`?
///
/// `district_admin` scope is global. `teacher`/`admin` are limited to their
/// own district; an unresolvable home district denies.
pub fn can_access_district(caller: &Caller, target_district: Uuid) -> bool {
    match caller.role {
        Role::DistrictAdmin => true,
        Role::Teacher | Role::Admin => caller.district_id == Some(target_district),
    }
}

/// Transfer approval authority is global by design: a district admin
/// approves or rejects transfers into and out of any district.
pub fn can_approve_transfers(caller: &Caller) -> bool {
    caller.role == Role::DistrictAdmin
}

/// Can the caller file a transfer request for a student currently in
/// `old_district`?
pub fn can_request_transfer(caller: &Caller, old_district: Uuid) -> bool {
    match caller.role {
        Role::DistrictAdmin => true,
        Role::Teacher | Role::Admin => can_access_district(caller, old_district),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(role: Role, district_id: Option<Uuid>) -> Caller {
        Caller::new(Uuid::new_v4(), role, district_id.map(|_| Uuid::new_v4()), district_id)
    }

    #[test]
    fn test_district_admin_is_global() {
        let da = caller(Role::DistrictAdmin, None);
        assert!(can_access_district(&da, Uuid::new_v4()));
        assert!(can_approve_transfers(&da));
        assert!(can_request_transfer(&da, Uuid::new_v4()));
    }

    #[test]
    fn test_teacher_limited_to_home_district() {
        let home = Uuid::new_v4();
        let t = caller(Role::Teacher, Some(home));
        assert!(can_access_district(&t, home));
        assert!(!can_access_district(&t, Uuid::new_v4()));
        assert!(can_request_transfer(&t, home));
        assert!(!can_request_transfer(&t, Uuid::new_v4()));
    }

    #[test]
    fn test_admin_limited_to_home_district() {
        let home = Uuid::new_v4();
        let a = caller(Role::Admin, Some(home));
        assert!(can_access_district(&a, home));
        assert!(!can_access_district(&a, Uuid::new_v4()));
    }

    #[test]
    fn test_unresolvable_scope_fails_closed() {
        // No school/district link: deny, never allow.
        for role in [Role::Teacher, Role::Admin] {
            let c = caller(role, None);
            assert!(!can_access_district(&c, Uuid::new_v4()));
            assert!(!can_request_transfer(&c, Uuid::new_v4()));
        }
    }

    #[test]
    fn test_only_district_admin_approves() {
        let home = Uuid::new_v4();
        assert!(!can_approve_transfers(&caller(Role::Teacher, Some(home))));
        assert!(!can_approve_transfers(&caller(Role::Admin, Some(home))));
        assert!(can_approve_transfers(&caller(Role::DistrictAdmin, None)));
    }
}
