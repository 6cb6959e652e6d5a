use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

use super::commands::{Command, EvaluationForm, HELP};
use crate::api::evaluations::{self, submit, SubmitOutcome};
use crate::api::users::{self, RegisterUser};
use crate::api::auth;
use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::error::{AppError, AppResult};
use crate::evaluations::NewEvaluation;
use crate::identity::{AccessGuard, Decision, IdentityResolver, SessionStore};
use crate::views::{EvaluationsView, GivenEvaluationsView, UsersView};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Quit,
}

/// Interpreter state shared by every command: one session, one API client and
/// one loader per page.
pub struct Shell {
    config: ClientConfig,
    session: Arc<SessionStore>,
    api: ApiClient,
    resolver: IdentityResolver,
    evaluations: EvaluationsView,
    given: GivenEvaluationsView,
    users: UsersView,
    /// Page the guard last bounced to login; the next login returns there.
    return_to: Mutex<Option<String>>,
}

impl Shell {
    pub fn new(config: ClientConfig, session: Arc<SessionStore>) -> Self {
        let api = ApiClient::new(&config, session.clone());
        Self::with_api(config, api)
    }

    pub fn with_api(config: ClientConfig, api: ApiClient) -> Self {
        let resolver = IdentityResolver::new(api.clone(), &config);
        Self {
            session: api.session().clone(),
            evaluations: EvaluationsView::new(api.clone()),
            given: GivenEvaluationsView::new(api.clone()),
            users: UsersView::new(api.clone()),
            resolver,
            api,
            config,
            return_to: Mutex::new(None),
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> { &self.session }

    pub async fn execute(&self, cmd: Command) -> AppResult<Reply> {
        debug!(target: "appraisal::cli", "execute {:?}", cmd);
        let text = match cmd {
            Command::Empty => String::new(),
            Command::Quit => return Ok(Reply::Quit),
            Command::Help => HELP.to_string(),
            Command::Status => self.status(),
            Command::Login { email, password, from } => {
                let bounced = self.return_to.lock().take();
                let from = from.or(bounced);
                let outcome = auth::login(&self.api, &self.resolver, &email, &password, from.as_deref()).await?;
                let who = outcome.user.as_ref().and_then(|u| u.email.clone()).unwrap_or_else(|| email.clone());
                format!("signed in as {}; continuing to {}", who, outcome.redirect_to)
            }
            Command::Logout => {
                self.return_to.lock().take();
                let cleared = auth::logout(&self.session);
                format!("signed out; continuing to {}", cleared.redirect_to)
            }
            Command::Register { email, password, full_name } => {
                let created = users::register(&self.api, &RegisterUser { email, password, full_name }).await?;
                format!("registered {} (id {}); sign in with login", created.email, created.id)
            }
            Command::Whoami => match self.session.snapshot() {
                s if !s.is_authenticated() => "not signed in".to_string(),
                s => match s.user {
                    Some(u) => pretty(&u),
                    None => "signed in; identity unknown".to_string(),
                },
            },
            Command::Refresh => match self.resolver.refresh().await {
                Some(u) => pretty(&u),
                None => "no identity could be resolved".to_string(),
            },
            Command::Profile { full_name } => {
                if let Err(redirect) = self.guard("/profile") { return Ok(Reply::Text(redirect)); }
                let updated = users::update_my_profile(&self.api, &full_name).await?;
                if let Some(mut stored) = self.session.user() {
                    stored.full_name = updated.full_name.clone();
                    self.session.set_user(&stored);
                }
                pretty(&updated)
            }
            Command::Open(path) => match self.guard(&path) {
                Ok(()) => format!("{}: allowed", path),
                Err(redirect) => redirect,
            },
            Command::Evaluations(filter) => {
                if let Err(redirect) = self.guard("/evaluations") { return Ok(Reply::Text(redirect)); }
                self.evaluations.set_filter(filter);
                self.evaluations.load().await;
                let snap = self.evaluations.snapshot();
                match snap.error {
                    Some(msg) => return Err(AppError::transport("load_failed", msg.as_str())),
                    None => pretty(&snap.outcome),
                }
            }
            Command::Summary => {
                if let Err(redirect) = self.guard("/evaluations") { return Ok(Reply::Text(redirect)); }
                pretty(&evaluations::summary(&self.api).await?)
            }
            Command::History { user_id } => {
                if let Err(redirect) = self.guard("/users") { return Ok(Reply::Text(redirect)); }
                pretty(&evaluations::for_user(&self.api, user_id).await?)
            }
            Command::User { email } => {
                if let Err(redirect) = self.guard("/users") { return Ok(Reply::Text(redirect)); }
                pretty(&users::by_email(&self.api, &email).await?)
            }
            Command::AssignManager { user_id, manager_id } => {
                if let Err(redirect) = self.guard("/users") { return Ok(Reply::Text(redirect)); }
                users::assign_manager(&self.api, user_id, manager_id).await?;
                format!("manager of user {} set to {}", user_id, manager_id)
            }
            Command::Given => {
                if let Err(redirect) = self.guard("/evaluations") { return Ok(Reply::Text(redirect)); }
                self.given.load().await;
                let st = self.given.state();
                match st.error {
                    Some(msg) => return Err(AppError::transport("load_failed", msg.as_str())),
                    None => pretty(&st.data),
                }
            }
            Command::Users => {
                if let Err(redirect) = self.guard("/users") { return Ok(Reply::Text(redirect)); }
                self.users.load().await;
                let st = self.users.state();
                match st.error {
                    Some(msg) => return Err(AppError::transport("load_failed", msg.as_str())),
                    None => pretty(&st.data),
                }
            }
            Command::New { email, form } => {
                if let Err(redirect) = self.guard("/evaluations/new") { return Ok(Reply::Text(redirect)); }
                self.submit(build(NewEvaluation::new(email), form)).await?
            }
            Command::SelfEval(form) => {
                if let Err(redirect) = self.guard("/evaluate") { return Ok(Reply::Text(redirect)); }
                let user = self.session.user().unwrap_or_default();
                self.submit(build(NewEvaluation::for_self(&user), form)).await?
            }
        };
        Ok(Reply::Text(text))
    }

    /// `Err` carries the message describing where the guard sent the user.
    fn guard(&self, path: &str) -> Result<(), String> {
        match AccessGuard::new(&self.session).navigate(path) {
            Decision::Authorized => Ok(()),
            Decision::Redirect { to, from } => {
                if let Some(from) = from {
                    *self.return_to.lock() = Some(from);
                }
                Err(format!("{}: not allowed; redirected to {}", path, to))
            }
        }
    }

    async fn submit(&self, new: NewEvaluation) -> AppResult<String> {
        Ok(match submit(&self.api, new).await? {
            SubmitOutcome::Saved { redirect_to } => format!("evaluation saved; continuing to {}", redirect_to),
            SubmitOutcome::SessionExpired { redirect_to } => {
                format!("session expired; sign in again (redirected to {})", redirect_to)
            }
        })
    }

    fn status(&self) -> String {
        let s = self.session.snapshot();
        let state_dir = self.config.state_dir.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "<memory>".into());
        format!(
            "backend: {}\nsession: {}\nrole: {}\nstate: {}\nprofile probes: {}",
            self.api.base(),
            if s.is_authenticated() { "signed in" } else { "signed out" },
            s.user.as_ref().and_then(|u| u.role.as_deref()).unwrap_or("-"),
            state_dir,
            self.resolver.paths().join(", "),
        )
    }
}

fn build(new: NewEvaluation, form: EvaluationForm) -> NewEvaluation {
    let new = match form.score {
        Some(s) => new.with_score(s),
        None => new,
    };
    new.with_comments(form.comments.as_deref())
        .with_period(form.period_start.as_deref(), form.period_end.as_deref())
}

fn pretty<T: Serialize>(v: &T) -> String {
    serde_json::to_string_pretty(v).unwrap_or_else(|e| format!("<unprintable: {}>", e))
}
