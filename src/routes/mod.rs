pub mod accounts;
pub mod appointments;
pub mod auth;
pub mod departments;
pub mod employees;
pub mod letters;
pub mod templates;

use axum::routing::{get, post};
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Auth
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/auth/me", get(auth::me))
        .route("/api/v1/auth/change-password", post(auth::change_password))
        // Accounts
        .route("/api/v1/accounts", get(accounts::list).post(accounts::create))
        .route(
            "/api/v1/accounts/{id}",
            get(accounts::get)
                .put(accounts::update)
                .delete(accounts::delete),
        )
        // Departments
        .route(
            "/api/v1/departments",
            get(departments::list).post(departments::create),
        )
        .route(
            "/api/v1/departments/{id}",
            get(departments::get)
                .put(departments::update)
                .delete(departments::delete),
        )
        // Employees
        .route(
            "/api/v1/employees",
            get(employees::list).post(employees::create),
        )
        .route(
            "/api/v1/employees/{id}",
            get(employees::get)
                .put(employees::update)
                .delete(employees::delete),
        )
        // Appointments
        .route(
            "/api/v1/appointments",
            get(appointments::list).post(appointments::create),
        )
        .route(
            "/api/v1/appointments/{id}",
            get(appointments::get)
                .put(appointments::update)
                .delete(appointments::delete),
        )
        // Templates
        .route(
            "/api/v1/templates",
            get(templates::list).post(templates::create),
        )
        .route(
            "/api/v1/templates/{id}",
            get(templates::get)
                .put(templates::update)
                .delete(templates::delete),
        )
        .route(
            "/api/v1/templates/{id}/employees/{employee_id}",
            get(templates::fill_for_employee),
        )
        // Cover letters
        .route(
            "/api/v1/letters/template",
            get(letters::get_template).put(letters::put_template),
        )
        .route("/api/v1/letters/{employee_id}/html", get(letters::html))
        .route("/api/v1/letters/{employee_id}/pdf", get(letters::pdf))
}
