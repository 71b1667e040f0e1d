//! OpenAPI / Swagger UI documentation.
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::auth::service::{AuthResponse, LoginRequest, LoginUser};
use crate::gateway::handlers::UploadDto;
use crate::gateway::handlers::classrooms::{ClassroomBody, EnrollBody};
use crate::gateway::handlers::health::HealthResponse;
use crate::gateway::handlers::records::AddWorkRequest;
use crate::gateway::handlers::transfers::{CreateTransferRequest, ResolveTransferRequest};
use crate::models::{Caller, Classroom, District, Enrollment, Role, School, Student, WorkRecord};
use crate::transfer::{RequestKind, TransferRecord, TransferStatus, TransferView};

/// Bearer JWT security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_jwt",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "District Records Portal API",
        version = "1.0.0",
        description = "District-scoped student records with an approval-gated inter-district transfer workflow."
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::auth::handlers::login,
        crate::auth::handlers::me,
        crate::gateway::handlers::transfers::create_transfer,
        crate::gateway::handlers::transfers::list_pending,
        crate::gateway::handlers::transfers::get_transfer,
        crate::gateway::handlers::transfers::approve_transfer,
        crate::gateway::handlers::transfers::reject_transfer,
        crate::gateway::handlers::students::list_students,
        crate::gateway::handlers::students::get_student,
        crate::gateway::handlers::records::add_work,
        crate::gateway::handlers::records::list_work,
        crate::gateway::handlers::records::download_work,
        crate::gateway::handlers::classrooms::list_classrooms,
        crate::gateway::handlers::classrooms::create_classroom,
        crate::gateway::handlers::classrooms::get_classroom,
        crate::gateway::handlers::classrooms::rename_classroom,
        crate::gateway::handlers::classrooms::delete_classroom,
        crate::gateway::handlers::classrooms::roster,
        crate::gateway::handlers::classrooms::enroll_student,
        crate::gateway::handlers::classrooms::unenroll_student,
        crate::gateway::handlers::districts::list_districts,
        crate::gateway::handlers::districts::list_schools,
    ),
    components(
        schemas(
            HealthResponse,
            LoginRequest,
            LoginUser,
            AuthResponse,
            Caller,
            Role,
            District,
            School,
            Student,
            Classroom,
            Enrollment,
            WorkRecord,
            TransferStatus,
            RequestKind,
            TransferRecord,
            TransferView,
            CreateTransferRequest,
            ResolveTransferRequest,
            UploadDto,
            AddWorkRequest,
            ClassroomBody,
            EnrollBody,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and database checks"),
        (name = "Auth", description = "Login and caller identity"),
        (name = "Transfers", description = "Inter-district transfer workflow"),
        (name = "Students", description = "District-scoped student directory"),
        (name = "Records", description = "Work samples"),
        (name = "Classrooms", description = "Classroom CRUD and rosters"),
        (name = "Districts", description = "District and school directory"),
    )
)]
pub struct ApiDoc;
