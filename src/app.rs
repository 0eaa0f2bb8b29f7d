//! Application state management for perfdeck.
//!
//! This module contains the core `App` struct that manages all application
//! state: UI state, fetched data, the session, form state, and background
//! task coordination.

use std::collections::HashMap;

use anyhow::Result;
use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::auth::{AuthManager, LoginRequest, SignupRequest};
use crate::config::Config;
use crate::models::{
    Employee, EmployeeInput, EmployeeSortColumn, EmployeeStats, PerformanceReview, ReviewInput,
    ReviewStats,
};
use crate::utils::{cmp_ignore_case, contains_ignore_case};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// A full refresh is six fetches; 32 leaves headroom.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for username input
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input
const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for form text fields
const MAX_FIELD_LENGTH: usize = 100;

/// Maximum length for free-text feedback
const MAX_FEEDBACK_LENGTH: usize = 500;

/// Number of items to scroll on page up/down
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Ratings are constrained to 1..=5 by the backend
pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs. Admin only appears for staff/superusers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Employees,
    Reviews,
    Admin,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Employees => "Employees",
            Tab::Reviews => "Reviews",
            Tab::Admin => "Admin",
        }
    }
}

/// Current UI focus area (list panel or detail panel)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Detail,
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    ShowingHelp,
    Authenticating,
    EditingEmployee,
    EditingReview,
    ConfirmingDelete,
    ConfirmingQuit,
    Quitting,
}

/// Which form the auth overlay shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Signup,
}

/// Focused field in the auth overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Username,
    Password,
    Email,
    FirstName,
    LastName,
    Submit,
}

impl AuthField {
    /// Cycle order depends on which form is showing
    pub fn next(self, mode: AuthMode) -> Self {
        match mode {
            AuthMode::Login => match self {
                AuthField::Username => AuthField::Password,
                AuthField::Password => AuthField::Submit,
                _ => AuthField::Username,
            },
            AuthMode::Signup => match self {
                AuthField::Username => AuthField::Email,
                AuthField::Email => AuthField::Password,
                AuthField::Password => AuthField::FirstName,
                AuthField::FirstName => AuthField::LastName,
                AuthField::LastName => AuthField::Submit,
                AuthField::Submit => AuthField::Username,
            },
        }
    }

    pub fn prev(self, mode: AuthMode) -> Self {
        match mode {
            AuthMode::Login => match self {
                AuthField::Username => AuthField::Submit,
                AuthField::Password => AuthField::Username,
                _ => AuthField::Password,
            },
            AuthMode::Signup => match self {
                AuthField::Username => AuthField::Submit,
                AuthField::Email => AuthField::Username,
                AuthField::Password => AuthField::Email,
                AuthField::FirstName => AuthField::Password,
                AuthField::LastName => AuthField::FirstName,
                AuthField::Submit => AuthField::LastName,
            },
        }
    }
}

/// Admin tab sub-view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminView {
    Employees,
    Reviews,
}

/// Focused field in the employee form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeeFormField {
    FirstName,
    LastName,
    Email,
    Department,
    JoinDate,
    Submit,
}

impl EmployeeFormField {
    pub fn next(self) -> Self {
        match self {
            EmployeeFormField::FirstName => EmployeeFormField::LastName,
            EmployeeFormField::LastName => EmployeeFormField::Email,
            EmployeeFormField::Email => EmployeeFormField::Department,
            EmployeeFormField::Department => EmployeeFormField::JoinDate,
            EmployeeFormField::JoinDate => EmployeeFormField::Submit,
            EmployeeFormField::Submit => EmployeeFormField::FirstName,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            EmployeeFormField::FirstName => EmployeeFormField::Submit,
            EmployeeFormField::LastName => EmployeeFormField::FirstName,
            EmployeeFormField::Email => EmployeeFormField::LastName,
            EmployeeFormField::Department => EmployeeFormField::Email,
            EmployeeFormField::JoinDate => EmployeeFormField::Department,
            EmployeeFormField::Submit => EmployeeFormField::JoinDate,
        }
    }
}

/// Create/edit form for an employee
#[derive(Debug, Clone)]
pub struct EmployeeForm {
    pub editing_id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: String,
    pub date_of_joining: String,
    pub focus: EmployeeFormField,
    pub error: Option<String>,
}

impl EmployeeForm {
    pub fn create() -> Self {
        Self {
            editing_id: None,
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            department: String::new(),
            // New employees default to joining today
            date_of_joining: Utc::now().date_naive().format("%Y-%m-%d").to_string(),
            focus: EmployeeFormField::FirstName,
            error: None,
        }
    }

    pub fn edit(employee: &Employee) -> Self {
        Self {
            editing_id: Some(employee.id),
            first_name: employee.first_name.clone(),
            last_name: employee.last_name.clone(),
            email: employee.email.clone(),
            department: employee.department.clone(),
            date_of_joining: employee.date_of_joining.clone(),
            focus: EmployeeFormField::FirstName,
            error: None,
        }
    }

    pub fn title(&self) -> &'static str {
        if self.editing_id.is_some() {
            "Edit Employee"
        } else {
            "Add New Employee"
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.first_name.trim().is_empty()
            || self.last_name.trim().is_empty()
            || self.email.trim().is_empty()
            || self.department.trim().is_empty()
        {
            return Err("All fields are required".to_string());
        }
        if !self.email.contains('@') {
            return Err("Enter a valid email address".to_string());
        }
        if chrono::NaiveDate::parse_from_str(&self.date_of_joining, "%Y-%m-%d").is_err() {
            return Err("Join date must be YYYY-MM-DD".to_string());
        }
        Ok(())
    }

    pub fn input(&self) -> EmployeeInput {
        EmployeeInput {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            department: self.department.trim().to_string(),
            date_of_joining: self.date_of_joining.trim().to_string(),
        }
    }

    pub fn field_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            EmployeeFormField::FirstName => Some(&mut self.first_name),
            EmployeeFormField::LastName => Some(&mut self.last_name),
            EmployeeFormField::Email => Some(&mut self.email),
            EmployeeFormField::Department => Some(&mut self.department),
            EmployeeFormField::JoinDate => Some(&mut self.date_of_joining),
            EmployeeFormField::Submit => None,
        }
    }
}

/// Focused field in the review form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewFormField {
    Employee,
    Period,
    Rating,
    Feedback,
    ReviewDate,
    Submit,
}

impl ReviewFormField {
    pub fn next(self) -> Self {
        match self {
            ReviewFormField::Employee => ReviewFormField::Period,
            ReviewFormField::Period => ReviewFormField::Rating,
            ReviewFormField::Rating => ReviewFormField::Feedback,
            ReviewFormField::Feedback => ReviewFormField::ReviewDate,
            ReviewFormField::ReviewDate => ReviewFormField::Submit,
            ReviewFormField::Submit => ReviewFormField::Employee,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ReviewFormField::Employee => ReviewFormField::Submit,
            ReviewFormField::Period => ReviewFormField::Employee,
            ReviewFormField::Rating => ReviewFormField::Period,
            ReviewFormField::Feedback => ReviewFormField::Rating,
            ReviewFormField::ReviewDate => ReviewFormField::Feedback,
            ReviewFormField::Submit => ReviewFormField::ReviewDate,
        }
    }
}

/// Create/edit form for a performance review.
/// The employee is picked from the fetched roster by index.
#[derive(Debug, Clone)]
pub struct ReviewForm {
    pub editing_id: Option<i64>,
    pub employee_index: usize,
    pub review_period: String,
    pub rating: i32,
    pub feedback: String,
    pub review_date: String,
    pub focus: ReviewFormField,
    pub error: Option<String>,
}

impl ReviewForm {
    pub fn create() -> Self {
        Self {
            editing_id: None,
            employee_index: 0,
            review_period: String::new(),
            rating: 3,
            feedback: String::new(),
            review_date: Utc::now().date_naive().format("%Y-%m-%d").to_string(),
            focus: ReviewFormField::Employee,
            error: None,
        }
    }

    pub fn edit(review: &PerformanceReview, employees: &[Employee]) -> Self {
        let employee_index = employees
            .iter()
            .position(|e| e.id == review.employee)
            .unwrap_or(0);
        Self {
            editing_id: Some(review.id),
            employee_index,
            review_period: review.review_period.clone(),
            rating: review.rating,
            feedback: review.feedback.clone().unwrap_or_default(),
            review_date: review.review_date.clone(),
            focus: ReviewFormField::Employee,
            error: None,
        }
    }

    pub fn title(&self) -> &'static str {
        if self.editing_id.is_some() {
            "Edit Review"
        } else {
            "Add New Review"
        }
    }

    pub fn validate(&self, employees: &[Employee]) -> Result<(), String> {
        if employees.is_empty() {
            return Err("No employees to review".to_string());
        }
        if self.review_period.trim().is_empty() {
            return Err("Review period is required".to_string());
        }
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err("Rating must be between 1 and 5".to_string());
        }
        if chrono::NaiveDate::parse_from_str(&self.review_date, "%Y-%m-%d").is_err() {
            return Err("Review date must be YYYY-MM-DD".to_string());
        }
        Ok(())
    }

    pub fn input(&self, employees: &[Employee]) -> Option<ReviewInput> {
        let employee = employees.get(self.employee_index)?;
        let feedback = self.feedback.trim();
        Some(ReviewInput {
            employee: employee.id,
            review_period: self.review_period.trim().to_string(),
            rating: self.rating,
            feedback: if feedback.is_empty() {
                None
            } else {
                Some(feedback.to_string())
            },
            review_date: self.review_date.trim().to_string(),
        })
    }

    pub fn field_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            ReviewFormField::Period => Some(&mut self.review_period),
            ReviewFormField::Feedback => Some(&mut self.feedback),
            ReviewFormField::ReviewDate => Some(&mut self.review_date),
            _ => None,
        }
    }
}

/// Record queued for deletion, pending confirmation
#[derive(Debug, Clone)]
pub enum DeleteTarget {
    Employee { id: i64, name: String },
    Review { id: i64, label: String },
}

impl DeleteTarget {
    pub fn description(&self) -> String {
        match self {
            DeleteTarget::Employee { name, .. } => format!("employee {}", name),
            DeleteTarget::Review { label, .. } => format!("review {}", label),
        }
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Result types from background refresh tasks, sent through an MPSC channel
/// back to the main loop.
enum RefreshResult {
    Employees(Vec<Employee>),
    Reviews(Vec<PerformanceReview>),
    Departments(Vec<String>),
    Periods(Vec<String>),
    EmployeeStats(EmployeeStats),
    ReviewStats(ReviewStats),
    /// Reviews belonging to one employee (employee_id, reviews)
    EmployeeReviews(i64, Vec<PerformanceReview>),
    /// A freshly fetched employee record, replacing the listed one
    EmployeeDetail(Employee),
    /// A freshly fetched review record, replacing the listed one
    ReviewDetail(PerformanceReview),
    RefreshComplete,
    Error(String),
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub api: ApiClient,
    pub auth: AuthManager,

    // UI state
    pub state: AppState,
    pub current_tab: Tab,
    pub focus: Focus,
    pub search_query: String,
    pub employee_sort_column: EmployeeSortColumn,
    pub employee_sort_ascending: bool,
    pub department_filter: Option<String>,
    pub period_filter: Option<String>,
    pub admin_view: AdminView,

    // Auth overlay state
    pub auth_mode: AuthMode,
    pub auth_focus: AuthField,
    pub auth_username: String,
    pub auth_password: String,
    pub auth_email: String,
    pub auth_first_name: String,
    pub auth_last_name: String,
    pub auth_error: Option<String>,

    // Selection indices
    pub employee_selection: usize,
    pub review_selection: usize,
    pub admin_employee_selection: usize,
    pub admin_review_selection: usize,

    // Fetched data
    pub employees: Vec<Employee>,
    pub reviews: Vec<PerformanceReview>,
    pub departments: Vec<String>,
    pub periods: Vec<String>,
    pub employee_stats: EmployeeStats,
    pub review_stats: ReviewStats,
    /// Reviews per employee, for the detail panel
    pub employee_reviews: HashMap<i64, Vec<PerformanceReview>>,

    // Admin form state
    pub employee_form: Option<EmployeeForm>,
    pub review_form: Option<ReviewForm>,
    pub delete_target: Option<DeleteTarget>,
    /// A mutation is in flight; submit controls are disabled
    pub submitting: bool,

    // Background task channel
    refresh_rx: mpsc::Receiver<RefreshResult>,
    refresh_tx: mpsc::Sender<RefreshResult>,

    pub loading: bool,
    pub status_message: Option<String>,
}

impl App {
    /// Create a new application instance
    pub fn new() -> Result<Self> {
        debug!("App::new() starting");
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let base_url = config.api_base_url();
        debug!(%base_url, "API base URL resolved");
        let api = ApiClient::new(base_url)?;

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let auth_username = std::env::var("PERFDECK_USERNAME")
            .ok()
            .or_else(|| config.last_username.clone())
            .unwrap_or_default();
        let auth_password = std::env::var("PERFDECK_PASSWORD").unwrap_or_default();

        Ok(Self {
            config,
            api,
            auth: AuthManager::new(),

            state: AppState::Normal,
            current_tab: Tab::Dashboard,
            focus: Focus::List,
            search_query: String::new(),
            employee_sort_column: EmployeeSortColumn::Name,
            employee_sort_ascending: true,
            department_filter: None,
            period_filter: None,
            admin_view: AdminView::Employees,

            auth_mode: AuthMode::Login,
            auth_focus: AuthField::Username,
            auth_username,
            auth_password,
            auth_email: String::new(),
            auth_first_name: String::new(),
            auth_last_name: String::new(),
            auth_error: None,

            employee_selection: 0,
            review_selection: 0,
            admin_employee_selection: 0,
            admin_review_selection: 0,

            employees: Vec::new(),
            reviews: Vec::new(),
            departments: Vec::new(),
            periods: Vec::new(),
            employee_stats: EmployeeStats::default(),
            review_stats: ReviewStats::default(),
            employee_reviews: HashMap::new(),

            employee_form: None,
            review_form: None,
            delete_target: None,
            submitting: false,

            refresh_rx: rx,
            refresh_tx: tx,

            loading: false,
            status_message: None,
        })
    }

    // =========================================================================
    // Auth flows
    // =========================================================================

    /// Startup handshake. Lands on the auth overlay when the session cookie
    /// is missing or stale, otherwise kicks off the first data refresh.
    pub async fn initialize(&mut self) {
        self.auth.initialize(&mut self.api).await;
        if self.auth.is_authenticated() {
            self.refresh_all_background();
        } else {
            self.start_auth();
        }
    }

    /// Show the auth overlay
    pub fn start_auth(&mut self) {
        self.state = AppState::Authenticating;
        self.auth_mode = AuthMode::Login;
        self.auth_focus = if self.auth_username.is_empty() {
            AuthField::Username
        } else {
            AuthField::Password
        };
        self.auth_error = None;
    }

    /// Flip the auth overlay between login and signup
    pub fn toggle_auth_mode(&mut self) {
        self.auth_mode = match self.auth_mode {
            AuthMode::Login => AuthMode::Signup,
            AuthMode::Signup => AuthMode::Login,
        };
        self.auth_focus = AuthField::Username;
        self.auth_error = None;
    }

    /// Submit the auth overlay (login or signup, per mode)
    pub async fn submit_auth(&mut self) {
        if self.submitting {
            return;
        }

        if self.auth_username.is_empty() || self.auth_password.is_empty() {
            self.auth_error = Some("Username and password required".to_string());
            return;
        }
        if self.auth_mode == AuthMode::Signup && self.auth_email.is_empty() {
            self.auth_error = Some("Email is required".to_string());
            return;
        }

        self.auth_error = None;
        self.submitting = true;

        let result = match self.auth_mode {
            AuthMode::Login => {
                let credentials = LoginRequest {
                    username: self.auth_username.clone(),
                    password: self.auth_password.clone(),
                };
                self.auth.login(&mut self.api, &credentials).await
            }
            AuthMode::Signup => {
                let profile = SignupRequest {
                    username: self.auth_username.clone(),
                    email: self.auth_email.clone(),
                    password: self.auth_password.clone(),
                    first_name: self.auth_first_name.clone(),
                    last_name: self.auth_last_name.clone(),
                };
                self.auth.signup(&mut self.api, &profile).await
            }
        };

        self.submitting = false;

        if result.success {
            self.config.last_username = Some(self.auth_username.clone());
            if let Err(e) = self.config.save() {
                warn!(error = %e, "Failed to save config");
            }

            self.auth_password.clear();
            self.state = AppState::Normal;
            self.refresh_all_background();
        } else {
            self.auth_error = result.error;
        }
    }

    /// Log out and return to the auth overlay. The session clears whether or
    /// not the server acknowledged.
    pub async fn logout(&mut self) {
        self.auth.logout(&self.api).await;

        self.employees.clear();
        self.reviews.clear();
        self.departments.clear();
        self.periods.clear();
        self.employee_stats = EmployeeStats::default();
        self.review_stats = ReviewStats::default();
        self.employee_reviews.clear();
        self.current_tab = Tab::Dashboard;
        self.status_message = None;

        self.start_auth();
    }

    // =========================================================================
    // Background data refresh
    // =========================================================================

    /// Spawn a background task to refresh everything the tabs display
    pub fn refresh_all_background(&mut self) {
        info!("Starting background refresh of all data");
        let api = self.api.clone();
        let tx = self.refresh_tx.clone();

        self.loading = true;
        self.status_message = Some("Refreshing data...".to_string());

        tokio::spawn(async move {
            Self::execute_background_refresh(api, tx).await;
        });
    }

    async fn execute_background_refresh(api: ApiClient, tx: mpsc::Sender<RefreshResult>) {
        // The dashboard wants all of these at once, so fetch concurrently
        let (employees, reviews, departments, periods, employee_stats, review_stats) = futures::join!(
            api.list_employees(),
            api.list_reviews(None),
            api.list_departments(),
            api.list_review_periods(),
            api.employee_statistics(),
            api.review_statistics(),
        );

        match employees {
            Ok(data) => Self::send_result(&tx, RefreshResult::Employees(data)).await,
            Err(e) => Self::send_result(&tx, RefreshResult::Error(e.to_string())).await,
        }
        match reviews {
            Ok(data) => Self::send_result(&tx, RefreshResult::Reviews(data)).await,
            Err(e) => Self::send_result(&tx, RefreshResult::Error(e.to_string())).await,
        }
        match departments {
            Ok(data) => Self::send_result(&tx, RefreshResult::Departments(data)).await,
            Err(e) => Self::send_result(&tx, RefreshResult::Error(e.to_string())).await,
        }
        match periods {
            Ok(data) => Self::send_result(&tx, RefreshResult::Periods(data)).await,
            Err(e) => Self::send_result(&tx, RefreshResult::Error(e.to_string())).await,
        }
        match employee_stats {
            Ok(data) => Self::send_result(&tx, RefreshResult::EmployeeStats(data)).await,
            Err(e) => Self::send_result(&tx, RefreshResult::Error(e.to_string())).await,
        }
        match review_stats {
            Ok(data) => Self::send_result(&tx, RefreshResult::ReviewStats(data)).await,
            Err(e) => Self::send_result(&tx, RefreshResult::Error(e.to_string())).await,
        }

        Self::send_result(&tx, RefreshResult::RefreshComplete).await;
    }

    async fn send_result(tx: &mpsc::Sender<RefreshResult>, result: RefreshResult) {
        if tx.send(result).await.is_err() {
            warn!("Refresh channel closed; dropping result");
        }
    }

    /// Fetch one employee fresh, plus their reviews, for the detail panel
    pub fn fetch_employee_detail(&mut self, employee_id: i64) {
        let api = self.api.clone();
        let tx = self.refresh_tx.clone();
        tokio::spawn(async move {
            let (employee, reviews) = futures::join!(
                api.get_employee(employee_id),
                api.employee_reviews(employee_id),
            );
            match employee {
                Ok(detail) => Self::send_result(&tx, RefreshResult::EmployeeDetail(detail)).await,
                Err(e) => Self::send_result(&tx, RefreshResult::Error(e.to_string())).await,
            }
            match reviews {
                Ok(reviews) => {
                    Self::send_result(&tx, RefreshResult::EmployeeReviews(employee_id, reviews))
                        .await;
                }
                Err(e) => Self::send_result(&tx, RefreshResult::Error(e.to_string())).await,
            }
        });
    }

    /// Fetch one review fresh for the detail panel
    pub fn fetch_review_detail(&mut self, review_id: i64) {
        let api = self.api.clone();
        let tx = self.refresh_tx.clone();
        tokio::spawn(async move {
            match api.get_review(review_id).await {
                Ok(review) => Self::send_result(&tx, RefreshResult::ReviewDetail(review)).await,
                Err(e) => Self::send_result(&tx, RefreshResult::Error(e.to_string())).await,
            }
        });
    }

    /// Drain completed background work into application state
    pub fn check_background_tasks(&mut self) {
        while let Ok(result) = self.refresh_rx.try_recv() {
            match result {
                RefreshResult::Employees(data) => {
                    self.employees = data;
                    self.clamp_selections();
                }
                RefreshResult::Reviews(data) => {
                    self.reviews = data;
                    self.clamp_selections();
                }
                RefreshResult::Departments(data) => self.departments = data,
                RefreshResult::Periods(data) => self.periods = data,
                RefreshResult::EmployeeStats(data) => self.employee_stats = data,
                RefreshResult::ReviewStats(data) => self.review_stats = data,
                RefreshResult::EmployeeReviews(id, reviews) => {
                    self.employee_reviews.insert(id, reviews);
                }
                RefreshResult::EmployeeDetail(detail) => {
                    if let Some(existing) =
                        self.employees.iter_mut().find(|e| e.id == detail.id)
                    {
                        *existing = detail;
                    }
                }
                RefreshResult::ReviewDetail(detail) => {
                    if let Some(existing) = self.reviews.iter_mut().find(|r| r.id == detail.id) {
                        *existing = detail;
                    }
                }
                RefreshResult::RefreshComplete => {
                    self.loading = false;
                    self.status_message = None;
                }
                RefreshResult::Error(message) => {
                    warn!(%message, "Background refresh error");
                    self.loading = false;
                    self.status_message = Some(message);
                }
            }
        }
    }

    fn clamp_selections(&mut self) {
        let employee_count = self.filtered_employees().len();
        let review_count = self.filtered_reviews().len();
        self.employee_selection = self.employee_selection.min(employee_count.saturating_sub(1));
        self.admin_employee_selection = self
            .admin_employee_selection
            .min(self.employees.len().saturating_sub(1));
        self.review_selection = self.review_selection.min(review_count.saturating_sub(1));
        self.admin_review_selection = self
            .admin_review_selection
            .min(self.reviews.len().saturating_sub(1));
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Tabs visible for the current session. Admin controls never render for
    /// non-admin users.
    pub fn visible_tabs(&self) -> Vec<Tab> {
        let mut tabs = vec![Tab::Dashboard, Tab::Employees, Tab::Reviews];
        if self.auth.is_admin() {
            tabs.push(Tab::Admin);
        }
        tabs
    }

    pub fn select_tab(&mut self, tab: Tab) {
        if tab == Tab::Admin && !self.auth.is_admin() {
            return;
        }
        self.current_tab = tab;
        self.focus = Focus::List;
    }

    pub fn next_tab(&mut self) {
        let tabs = self.visible_tabs();
        let idx = tabs.iter().position(|t| *t == self.current_tab).unwrap_or(0);
        self.current_tab = tabs[(idx + 1) % tabs.len()];
        self.focus = Focus::List;
    }

    pub fn prev_tab(&mut self) {
        let tabs = self.visible_tabs();
        let idx = tabs.iter().position(|t| *t == self.current_tab).unwrap_or(0);
        self.current_tab = tabs[(idx + tabs.len() - 1) % tabs.len()];
        self.focus = Focus::List;
    }

    // =========================================================================
    // Filtered / sorted accessors
    // =========================================================================

    /// Employees matching the search box and department filter, in the
    /// current sort order
    pub fn filtered_employees(&self) -> Vec<&Employee> {
        let mut result: Vec<&Employee> = self
            .employees
            .iter()
            .filter(|e| {
                let matches_search = self.search_query.is_empty()
                    || contains_ignore_case(&e.full_name(), &self.search_query)
                    || contains_ignore_case(&e.email, &self.search_query);
                let matches_department = match self.department_filter {
                    Some(ref dept) => e.department == *dept,
                    None => true,
                };
                matches_search && matches_department
            })
            .collect();

        result.sort_by(|a, b| {
            let ordering = match self.employee_sort_column {
                EmployeeSortColumn::Name => cmp_ignore_case(&a.display_name(), &b.display_name()),
                EmployeeSortColumn::Department => cmp_ignore_case(&a.department, &b.department),
                EmployeeSortColumn::JoinDate => a.date_of_joining.cmp(&b.date_of_joining),
                EmployeeSortColumn::Reviews => a.reviews_count.cmp(&b.reviews_count),
                EmployeeSortColumn::Rating => a
                    .average_rating
                    .unwrap_or(0.0)
                    .partial_cmp(&b.average_rating.unwrap_or(0.0))
                    .unwrap_or(std::cmp::Ordering::Equal),
            };
            if self.employee_sort_ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });

        result
    }

    /// Reviews matching the period filter, fetch order preserved
    pub fn filtered_reviews(&self) -> Vec<&PerformanceReview> {
        crate::models::filter_by_period(&self.reviews, self.period_filter.as_deref())
    }

    pub fn selected_employee(&self) -> Option<&Employee> {
        self.filtered_employees().get(self.employee_selection).copied()
    }

    pub fn selected_review(&self) -> Option<&PerformanceReview> {
        self.filtered_reviews().get(self.review_selection).copied()
    }

    pub fn toggle_employee_sort(&mut self, column: EmployeeSortColumn) {
        if self.employee_sort_column == column {
            self.employee_sort_ascending = !self.employee_sort_ascending;
        } else {
            self.employee_sort_column = column;
            self.employee_sort_ascending = true;
        }
        self.employee_selection = 0;
    }

    /// Step the department filter through None -> each department -> None
    pub fn cycle_department_filter(&mut self) {
        self.department_filter = match self.department_filter.take() {
            None => self.departments.first().cloned(),
            Some(current) => {
                let idx = self.departments.iter().position(|d| *d == current);
                match idx {
                    Some(i) if i + 1 < self.departments.len() => {
                        Some(self.departments[i + 1].clone())
                    }
                    _ => None,
                }
            }
        };
        self.employee_selection = 0;
    }

    /// Step the period filter through None -> each period -> None
    pub fn cycle_period_filter(&mut self) {
        self.period_filter = match self.period_filter.take() {
            None => self.periods.first().cloned(),
            Some(current) => {
                let idx = self.periods.iter().position(|p| *p == current);
                match idx {
                    Some(i) if i + 1 < self.periods.len() => Some(self.periods[i + 1].clone()),
                    _ => None,
                }
            }
        };
        self.review_selection = 0;
    }

    // =========================================================================
    // Admin mutations
    // =========================================================================

    /// Open the employee form; `None` creates, `Some` edits
    pub fn open_employee_form(&mut self, employee: Option<&Employee>) {
        if !self.auth.is_admin() {
            return;
        }
        self.employee_form = Some(match employee {
            Some(e) => EmployeeForm::edit(e),
            None => EmployeeForm::create(),
        });
        self.state = AppState::EditingEmployee;
    }

    /// Open the review form; `None` creates, `Some` edits
    pub fn open_review_form(&mut self, review: Option<&PerformanceReview>) {
        if !self.auth.is_admin() {
            return;
        }
        self.review_form = Some(match review {
            Some(r) => ReviewForm::edit(r, &self.employees),
            None => ReviewForm::create(),
        });
        self.state = AppState::EditingReview;
    }

    pub fn close_forms(&mut self) {
        self.employee_form = None;
        self.review_form = None;
        self.state = AppState::Normal;
    }

    /// Submit the employee form. Re-submission while a call is in flight is
    /// ignored; the button renders disabled.
    pub async fn submit_employee_form(&mut self) {
        if self.submitting {
            return;
        }
        let Some(form) = self.employee_form.clone() else {
            return;
        };

        if let Err(message) = form.validate() {
            if let Some(ref mut f) = self.employee_form {
                f.error = Some(message);
            }
            return;
        }

        self.submitting = true;
        let input = form.input();
        let result = match form.editing_id {
            Some(id) => self.api.update_employee(id, &input).await,
            None => self.api.create_employee(&input).await,
        };
        self.submitting = false;

        match result {
            Ok(saved) => {
                info!(employee_id = saved.id, "Employee saved");
                self.status_message = Some(format!("Saved {}", saved.full_name()));
                self.close_forms();
                self.refresh_all_background();
            }
            Err(err) => {
                let message = err
                    .server_message()
                    .unwrap_or("Failed to save employee")
                    .to_string();
                if let Some(ref mut f) = self.employee_form {
                    f.error = Some(message);
                }
            }
        }
    }

    /// Submit the review form, same contract as the employee form
    pub async fn submit_review_form(&mut self) {
        if self.submitting {
            return;
        }
        let Some(form) = self.review_form.clone() else {
            return;
        };

        if let Err(message) = form.validate(&self.employees) {
            if let Some(ref mut f) = self.review_form {
                f.error = Some(message);
            }
            return;
        }
        let Some(input) = form.input(&self.employees) else {
            return;
        };

        self.submitting = true;
        let result = match form.editing_id {
            Some(id) => self.api.update_review(id, &input).await,
            None => self.api.create_review(&input).await,
        };
        self.submitting = false;

        match result {
            Ok(saved) => {
                info!(review_id = saved.id, "Review saved");
                self.status_message = Some(format!("Saved review for {}", saved.employee_display()));
                self.close_forms();
                self.refresh_all_background();
            }
            Err(err) => {
                let message = err
                    .server_message()
                    .unwrap_or("Failed to save review")
                    .to_string();
                if let Some(ref mut f) = self.review_form {
                    f.error = Some(message);
                }
            }
        }
    }

    /// Queue a deletion behind a confirmation overlay
    pub fn request_delete(&mut self, target: DeleteTarget) {
        if !self.auth.is_admin() {
            return;
        }
        self.delete_target = Some(target);
        self.state = AppState::ConfirmingDelete;
    }

    pub fn cancel_delete(&mut self) {
        self.delete_target = None;
        self.state = AppState::Normal;
    }

    /// Perform the queued deletion. The local list drops the record on
    /// success; a failure leaves everything as it was plus a banner.
    pub async fn confirm_delete(&mut self) {
        if self.submitting {
            return;
        }
        let Some(target) = self.delete_target.take() else {
            self.state = AppState::Normal;
            return;
        };
        self.state = AppState::Normal;

        self.submitting = true;
        let result = match target {
            DeleteTarget::Employee { id, ref name } => {
                let result = self.api.delete_employee(id).await;
                if result.is_ok() {
                    self.employees.retain(|e| e.id != id);
                    self.employee_reviews.remove(&id);
                    self.status_message = Some(format!("Deleted {}", name));
                }
                result
            }
            DeleteTarget::Review { id, ref label } => {
                let result = self.api.delete_review(id).await;
                if result.is_ok() {
                    self.reviews.retain(|r| r.id != id);
                    self.status_message = Some(format!("Deleted {}", label));
                }
                result
            }
        };
        self.submitting = false;

        match result {
            Ok(()) => {
                self.clamp_selections();
                self.refresh_all_background();
            }
            Err(err) => {
                self.status_message = Some(
                    err.server_message()
                        .unwrap_or("Delete failed")
                        .to_string(),
                );
            }
        }
    }

    // =========================================================================
    // Input helpers
    // =========================================================================

    pub fn push_auth_char(&mut self, c: char) {
        let field = match self.auth_focus {
            AuthField::Username => Some((&mut self.auth_username, MAX_USERNAME_LENGTH)),
            AuthField::Password => Some((&mut self.auth_password, MAX_PASSWORD_LENGTH)),
            AuthField::Email => Some((&mut self.auth_email, MAX_FIELD_LENGTH)),
            AuthField::FirstName => Some((&mut self.auth_first_name, MAX_FIELD_LENGTH)),
            AuthField::LastName => Some((&mut self.auth_last_name, MAX_FIELD_LENGTH)),
            AuthField::Submit => None,
        };
        if let Some((field, max_len)) = field {
            if field.chars().count() < max_len && !c.is_control() {
                field.push(c);
            }
        }
    }

    pub fn pop_auth_char(&mut self) {
        let field = match self.auth_focus {
            AuthField::Username => Some(&mut self.auth_username),
            AuthField::Password => Some(&mut self.auth_password),
            AuthField::Email => Some(&mut self.auth_email),
            AuthField::FirstName => Some(&mut self.auth_first_name),
            AuthField::LastName => Some(&mut self.auth_last_name),
            AuthField::Submit => None,
        };
        if let Some(field) = field {
            field.pop();
        }
    }

    pub fn push_form_char(&mut self, c: char) {
        if c.is_control() {
            return;
        }
        if let Some(ref mut form) = self.employee_form {
            if let Some(field) = form.field_mut() {
                if field.chars().count() < MAX_FIELD_LENGTH {
                    field.push(c);
                }
                form.error = None;
            }
        } else if let Some(ref mut form) = self.review_form {
            let max_len = if form.focus == ReviewFormField::Feedback {
                MAX_FEEDBACK_LENGTH
            } else {
                MAX_FIELD_LENGTH
            };
            if let Some(field) = form.field_mut() {
                if field.chars().count() < max_len {
                    field.push(c);
                }
                form.error = None;
            }
        }
    }

    pub fn pop_form_char(&mut self) {
        if let Some(ref mut form) = self.employee_form {
            if let Some(field) = form.field_mut() {
                field.pop();
            }
        } else if let Some(ref mut form) = self.review_form {
            if let Some(field) = form.field_mut() {
                field.pop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        // Client construction touches no network; config load falls back to
        // defaults when no file exists
        let mut app = App::new().expect("app should build");
        app.employees = vec![
            sample_employee(1, "Alice", "Johnson", "Engineering", "2023-04-01"),
            sample_employee(2, "Bob", "Smith", "Sales", "2024-01-15"),
            sample_employee(3, "Cara", "Nguyen", "Engineering", "2022-08-20"),
        ];
        app.departments = vec!["Engineering".to_string(), "Sales".to_string()];
        app
    }

    fn sample_employee(id: i64, first: &str, last: &str, dept: &str, joined: &str) -> Employee {
        Employee {
            id,
            first_name: first.to_string(),
            last_name: last.to_string(),
            full_name: None,
            email: format!("{}@example.com", first.to_lowercase()),
            department: dept.to_string(),
            date_of_joining: joined.to_string(),
            reviews_count: 0,
            average_rating: None,
            performance_reviews: vec![],
        }
    }

    #[tokio::test]
    async fn test_search_filter_matches_name_and_email() {
        let mut app = test_app();
        app.search_query = "ali".to_string();
        let filtered = app.filtered_employees();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].first_name, "Alice");

        // Email matches too
        app.search_query = "bob@example".to_string();
        let filtered = app.filtered_employees();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].first_name, "Bob");
    }

    #[tokio::test]
    async fn test_department_filter_cycles_through_and_back_to_none() {
        let mut app = test_app();
        assert_eq!(app.department_filter, None);

        app.cycle_department_filter();
        assert_eq!(app.department_filter.as_deref(), Some("Engineering"));
        assert_eq!(app.filtered_employees().len(), 2);

        app.cycle_department_filter();
        assert_eq!(app.department_filter.as_deref(), Some("Sales"));
        assert_eq!(app.filtered_employees().len(), 1);

        app.cycle_department_filter();
        assert_eq!(app.department_filter, None);
        assert_eq!(app.filtered_employees().len(), 3);
    }

    #[tokio::test]
    async fn test_employee_sort_toggle() {
        let mut app = test_app();
        // Default: by display name ascending
        let names: Vec<String> = app
            .filtered_employees()
            .iter()
            .map(|e| e.last_name.clone())
            .collect();
        assert_eq!(names, vec!["Johnson", "Nguyen", "Smith"]);

        // Same column again flips direction
        app.toggle_employee_sort(EmployeeSortColumn::Name);
        let names: Vec<String> = app
            .filtered_employees()
            .iter()
            .map(|e| e.last_name.clone())
            .collect();
        assert_eq!(names, vec!["Smith", "Nguyen", "Johnson"]);

        app.toggle_employee_sort(EmployeeSortColumn::JoinDate);
        assert!(app.employee_sort_ascending);
        let first = app.filtered_employees()[0].id;
        assert_eq!(first, 3); // earliest join date
    }

    #[tokio::test]
    async fn test_admin_tab_hidden_for_non_admin() {
        let mut app = test_app();
        assert_eq!(
            app.visible_tabs(),
            vec![Tab::Dashboard, Tab::Employees, Tab::Reviews]
        );

        app.select_tab(Tab::Admin);
        assert_eq!(app.current_tab, Tab::Dashboard);

        // Admin-gated actions are no-ops as well
        app.open_employee_form(None);
        assert!(app.employee_form.is_none());
        assert_eq!(app.state, AppState::Normal);
    }

    #[tokio::test]
    async fn test_period_filter_preserves_fetch_order() {
        let mut app = test_app();
        app.reviews = vec![
            sample_review(1, "Q1 2024", 5),
            sample_review(2, "Q2 2024", 3),
            sample_review(3, "Q1 2024", 4),
        ];
        app.periods = vec!["Q1 2024".to_string(), "Q2 2024".to_string()];

        app.cycle_period_filter();
        assert_eq!(app.period_filter.as_deref(), Some("Q1 2024"));
        let ids: Vec<i64> = app.filtered_reviews().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    fn sample_review(id: i64, period: &str, rating: i32) -> PerformanceReview {
        PerformanceReview {
            id,
            employee: 1,
            employee_name: Some("Alice Johnson".to_string()),
            review_period: period.to_string(),
            rating,
            rating_display: None,
            feedback: None,
            review_date: "2024-03-31".to_string(),
        }
    }
}
