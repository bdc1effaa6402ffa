use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 7,
        "employee_code": "FLD-007",
        "first_name": "Jane",
        "last_name": "Doe",
        "email": "jane.doe@company.com",
        "phone": "+8801712345678",
        "status": "active",
        "hire_date": "2024-01-01"
    })
)]
pub struct Employee {
    #[schema(example = 7)]
    pub id: i64,

    #[schema(example = "FLD-007", nullable = true)]
    pub employee_code: Option<String>,

    #[schema(example = "Jane")]
    pub first_name: String,

    #[schema(example = "Doe", nullable = true)]
    pub last_name: Option<String>,

    #[schema(example = "jane.doe@company.com")]
    pub email: String,

    #[schema(example = "+8801712345678", nullable = true)]
    pub phone: Option<String>,

    #[schema(example = "active")]
    pub status: String,

    #[schema(example = "2024-01-01", value_type = Option<String>, format = "date", nullable = true)]
    pub hire_date: Option<NaiveDate>,
}
