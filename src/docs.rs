use crate::api::checkin::CheckinRequest;
use crate::api::client::CreateClient;
use crate::api::dashboard::{DashboardSummary, OnSiteEntry};
use crate::api::employee::{CreateEmployee, EmployeeListResponse, EmployeeQuery};
use crate::model::checkin::{Checkin, CheckinStatus};
use crate::model::client::ClientSite;
use crate::model::employee::Employee;
use crate::service::report::{DailyReport, DailyVisit};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Fieldtrack API",
        version = "1.0.0",
        description = r#"
## Field Employee Check-in Tracker

This API tracks field employees checking in and out of client sites.

### Key Features
- **Check-in Lifecycle**
  - Check in at a client site, check out, view the active visit and history
  - At most one open check-in per employee, enforced down to the storage layer
- **Client Sites**
  - Manage the sites employees visit
- **Employee Management**
  - Create, update, list, and view employee profiles
- **Dashboard & Reports**
  - Live "who is on site" view and per-day aggregates

### Security
Endpoints are protected with **JWT Bearer authentication**.
Mutating site/employee data requires the **Manager** or **Admin** role.

### Conventions
- Timestamps are stored as UTC without an offset marker and serialized with
  an explicit `Z` suffix.
- "Not checked in" is a normal state: `/checkin/active` returns an explicit
  null payload, never a 404.
"#,
    ),
    paths(
        crate::api::checkin::check_in,
        crate::api::checkin::check_out,
        crate::api::checkin::active,
        crate::api::checkin::history,

        crate::api::client::create_client,
        crate::api::client::list_clients,
        crate::api::client::get_client,
        crate::api::client::update_client,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::dashboard::summary,
        crate::api::dashboard::active_now,

        crate::api::report::daily
    ),
    components(
        schemas(
            Checkin,
            CheckinStatus,
            CheckinRequest,
            ClientSite,
            CreateClient,
            Employee,
            CreateEmployee,
            EmployeeQuery,
            EmployeeListResponse,
            DashboardSummary,
            OnSiteEntry,
            DailyReport,
            DailyVisit
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Checkin", description = "Check-in lifecycle APIs"),
        (name = "Clients", description = "Client site APIs"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Dashboard", description = "Live dashboard APIs"),
        (name = "Reports", description = "Reporting APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
