use crate::evaluations::FilterState;

/// Fields of an evaluation form typed on one line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationForm {
    pub score: Option<f64>,
    pub comments: Option<String>,
    pub period_start: Option<String>,
    pub period_end: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Login { email: String, password: String, from: Option<String> },
    Logout,
    Register { email: String, password: String, full_name: Option<String> },
    Whoami,
    Refresh,
    Profile { full_name: String },
    Open(String),
    Evaluations(FilterState),
    Summary,
    Given,
    History { user_id: i64 },
    New { email: String, form: EvaluationForm },
    SelfEval(EvaluationForm),
    Users,
    User { email: String },
    AssignManager { user_id: i64, manager_id: i64 },
    Status,
    Help,
    Quit,
    Empty,
}

/// Parse one interpreter line. Keywords are case-insensitive; arguments keep
/// their case.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some(head) = parts.first() else { return Ok(Command::Empty) };
    let args = &parts[1..];
    match head.to_ascii_lowercase().as_str() {
        "login" => match args {
            [email, password] => Ok(Command::Login { email: email.to_string(), password: password.to_string(), from: None }),
            [email, password, from] => Ok(Command::Login {
                email: email.to_string(),
                password: password.to_string(),
                from: Some(from.to_string()),
            }),
            _ => Err("usage: login <email> <password> [return-path]".into()),
        },
        "logout" => Ok(Command::Logout),
        "whoami" => Ok(Command::Whoami),
        "refresh" => Ok(Command::Refresh),
        "open" => match args {
            [path] => Ok(Command::Open(path.to_string())),
            _ => Err("usage: open <path>".into()),
        },
        "evaluations" | "evals" => parse_filter(args).map(Command::Evaluations),
        "given" => Ok(Command::Given),
        "new" => match args {
            [email, rest @ ..] => Ok(Command::New { email: email.to_string(), form: parse_form(rest)? }),
            _ => Err("usage: new <employee-email> [score] [comments...] [--from date] [--to date]".into()),
        },
        "self-eval" => parse_form(args).map(Command::SelfEval),
        "summary" => Ok(Command::Summary),
        "history" => match args {
            [id] => Ok(Command::History { user_id: parse_id(id)? }),
            _ => Err("usage: history <user-id>".into()),
        },
        "profile" => match args {
            [] => Err("usage: profile <full name>".into()),
            name => Ok(Command::Profile { full_name: name.join(" ") }),
        },
        "register" => match args {
            [email, password, name @ ..] => Ok(Command::Register {
                email: email.to_string(),
                password: password.to_string(),
                full_name: if name.is_empty() { None } else { Some(name.join(" ")) },
            }),
            _ => Err("usage: register <email> <password> [full name]".into()),
        },
        "user" => match args {
            [email] => Ok(Command::User { email: email.to_string() }),
            _ => Err("usage: user <email>".into()),
        },
        "assign" => match args {
            [user, manager] => Ok(Command::AssignManager { user_id: parse_id(user)?, manager_id: parse_id(manager)? }),
            _ => Err("usage: assign <user-id> <manager-id>".into()),
        },
        "users" => Ok(Command::Users),
        "status" => Ok(Command::Status),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command '{}'; type 'help'", other)),
    }
}

fn parse_filter(args: &[&str]) -> Result<FilterState, String> {
    let mut f = FilterState::default();
    let mut i = 0usize;
    while i < args.len() {
        let value = args.get(i + 1).copied();
        match (args[i], value) {
            ("--q", Some(v)) => f.query = v.to_string(),
            ("--year", Some(v)) => f.year = Some(v.parse().map_err(|_| format!("invalid year '{}'", v))?),
            ("--quarter", Some(v)) => f.quarter = Some(v.to_string()),
            ("--type", Some(v)) => f.kind = Some(v.to_string()),
            (flag, _) => return Err(format!("unexpected argument '{}'; filters are --q, --year, --quarter, --type", flag)),
        }
        i += 2;
    }
    Ok(f)
}

fn parse_id(raw: &str) -> Result<i64, String> {
    raw.parse().map_err(|_| format!("invalid id '{}'", raw))
}

/// `[score] [comments...]` with `--from`/`--to` period flags anywhere.
fn parse_form(args: &[&str]) -> Result<EvaluationForm, String> {
    let mut form = EvaluationForm::default();
    let mut words: Vec<&str> = Vec::new();
    let mut i = 0usize;
    while i < args.len() {
        match args[i] {
            flag @ ("--from" | "--to") => {
                let v = args.get(i + 1).ok_or_else(|| format!("{} needs a date", flag))?;
                if flag == "--from" { form.period_start = Some(v.to_string()); } else { form.period_end = Some(v.to_string()); }
                i += 2;
            }
            w => {
                words.push(w);
                i += 1;
            }
        }
    }
    if let Some((score, rest)) = words.split_first() {
        form.score = Some(score.parse().map_err(|_| format!("invalid score '{}'", score))?);
        if !rest.is_empty() { form.comments = Some(rest.join(" ")); }
    }
    Ok(form)
}

pub const HELP: &str = "Commands:
  login <email> <password> [path]   sign in, then return to path (default /profile)
  logout                            end the session
  register <email> <password> [name]
                                    create an account
  whoami                            show the stored identity
  refresh                           re-resolve the identity from the backend
  profile <full name>               change your display name
  open <path>                       check whether a page is reachable
  evaluations [--q text] [--year N] [--quarter Q] [--type T]
                                    received evaluations with statistics
  summary                           totals for evaluations you received
  given                             evaluations you wrote
  history <user-id>                 evaluations of one user (managers and admins)
  new <email> [score] [comments] [--from date] [--to date]
                                    submit an evaluation for an employee
  self-eval [score] [comments] [--from date] [--to date]
                                    submit a self-evaluation
  users                             user directory (managers and admins)
  user <email>                      look up one user (managers and admins)
  assign <user-id> <manager-id>     set a user's manager (managers and admins)
  status                            backend and session info
  help                              show this help
  quit | exit                       leave the interpreter";
