// src/templates.rs
use crate::models::allotment::Allotment;
use askama::Template;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignupPage {
    pub error: Option<String>,
    pub departments: &'static [&'static str],
}

#[derive(Template)]
#[template(path = "admin.html")]
pub struct AdminPage {
    pub username: String,
    pub day: String,
    pub rows: Vec<Allotment>,
    // Choices for the manual update form
    pub departments: &'static [&'static str],
    pub years: &'static [&'static str],
    pub sections: &'static [&'static str],
    // Feedback carried over the redirect (?success=... / ?error=...)
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

#[derive(Template)]
#[template(path = "student.html")]
pub struct StudentPage {
    pub username: String,
    pub department: String,
    pub rows: Vec<Allotment>,
}
