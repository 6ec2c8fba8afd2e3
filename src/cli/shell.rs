//! Interactive polling shell.
//!
//! Every view command navigates through the route guard before touching the API, the same
//! way the web client only fetches data for a page it is allowed to render.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use serde_json::{json, Value};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::models::{Poll, PollResults, VoteStatus};
use crate::app::App;
use crate::config::OutputMode;
use crate::error::{ClientError, ClientResult};
use crate::identity::{check_access, GuardDecision, LoginRequest, RegisterRequest, Role, SessionStatus};
use crate::router::{Route, RouteAccess};
use crate::views::audit::{audit_csv, distinct_actions, resource_label, result_label, AUDIT_CSV_FILE, AUDIT_PAGE_SIZE};
use crate::views::dashboard::{dashboard_title, initials, uses_server_metrics};
use crate::views::format::{format_date, format_timestamp, percent_label};
use crate::views::polls::filter_polls;
use crate::views::register::role_for_slug;
use crate::views::{
    password_strength, AuditFilter, DashboardStats, Pagination, PollCard, PollDetailView, PollForm, PollTab, ResultsView, Toast,
    VoteReceiptView,
};

use super::outputformatter::{print_json, print_table, Table};

pub const HELP: &str = "Commands:
  login <email> <password>                 sign in
  logout                                   sign out and forget stored tokens
  register <voter|poll-admin> <email> <password> <confirm>
  whoami                                   show the signed-in profile
  goto <path>                              navigate to a route (e.g. /polls/42)
  polls [active|closed|draft|results]      list polls for a tab
  poll <id>                                show a poll
  create <title> <option> <option>... [--desc <text>]
  edit <id> [title] [option...] [--desc <text>]
  publish [id] | close [id] | delete [id]  admin poll actions
  vote [id] <choice>                       vote by option number or option id
  results [id] [--csv [file]]              show (or export) results
  voted [id]                               show your vote receipt
  metrics                                  admin dashboard numbers
  audit [page] [search] [--action <A>] [--csv [file]]
  status                                   session and connection info
  help                                     this text
  quit | exit                              leave the shell";

/// What a command produced, rendered according to the output mode.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Reply {
    pub lines: Vec<String>,
    pub table: Option<Table>,
    pub footer: Vec<String>,
    pub json: Option<Value>,
    pub quit: bool,
}

impl Reply {
    pub fn line(s: impl Into<String>) -> Self { Self { lines: vec![s.into()], ..Default::default() } }

    pub fn toast(t: Toast) -> Self { Self::line(t.to_string()) }

    fn push(&mut self, s: impl Into<String>) { self.lines.push(s.into()); }

    fn with_json(mut self, v: Value) -> Self {
        self.json = Some(v);
        self
    }

    /// Everything a terminal would show in table mode, table included.
    pub fn to_text(&self) -> String {
        let mut out = self.lines.clone();
        if let Some(t) = &self.table {
            out.extend(super::outputformatter::render_table(t, 120, false));
        }
        out.extend(self.footer.iter().cloned());
        out.join("\n")
    }
}

pub struct Shell {
    app: App,
    output: OutputMode,
    status_rx: watch::Receiver<SessionStatus>,
}

impl Shell {
    pub fn new(app: App) -> Self {
        let output = app.config().output;
        let status_rx = app.session().subscribe();
        Self { app, output, status_rx }
    }

    pub fn app(&self) -> &App { &self.app }

    pub fn app_mut(&mut self) -> &mut App { &mut self.app }

    pub async fn start(&mut self) -> SessionStatus {
        let status = self.app.start().await;
        let _ = self.status_rx.borrow_and_update();
        status
    }

    /// Run one command line. Errors are turned into notifications here; a session expiry
    /// also sends the shell back to the login route.
    pub async fn execute(&mut self, line: &str) -> Reply {
        let args = match split_args(line) {
            Ok(a) => a,
            Err(e) => return Reply::toast(Toast::from_error("Invalid input", &e)),
        };
        let Some((cmd, rest)) = args.split_first() else { return Reply::default() };
        let cmd = cmd.to_ascii_lowercase();
        let result = self.dispatch(&cmd, rest).await;
        let mut reply = match result {
            Ok(r) => r,
            Err(e) => {
                debug!(command = %cmd, code = e.code_str(), "command failed");
                let mut r = Reply::toast(Toast::from_error(&failure_title(&cmd), &e));
                if let Some(route) = self.app.handle_error(&e) {
                    r.push(format!("-> {}", route));
                }
                r
            }
        };
        self.sync_session(&mut reply);
        reply
    }

    /// Picks up session transitions that happened inside the pipeline (e.g. a failed refresh).
    fn sync_session(&mut self, reply: &mut Reply) {
        if !self.status_rx.has_changed().unwrap_or(false) {
            return;
        }
        let status = *self.status_rx.borrow_and_update();
        if status == SessionStatus::Unauthenticated {
            let before = self.app.current().clone();
            let after = self.app.revalidate();
            if before != after {
                reply.push(format!("-> {}", after));
            }
        }
    }

    async fn dispatch(&mut self, cmd: &str, args: &[String]) -> ClientResult<Reply> {
        match cmd {
            "help" | "?" => Ok(Reply::line(HELP)),
            "quit" | "exit" => Ok(Reply { quit: true, ..Default::default() }),
            "status" => Ok(self.status()),
            "login" => self.login(args).await,
            "logout" => self.logout().await,
            "register" => self.register(args).await,
            "whoami" | "profile" => self.whoami(),
            "goto" | "go" => self.goto(args),
            "polls" => self.polls(args).await,
            "poll" => self.poll(args).await,
            "create" => self.create(args).await,
            "edit" => self.edit(args).await,
            "publish" | "close" | "delete" => self.admin_action(cmd, args).await,
            "vote" => self.vote(args).await,
            "results" => self.results(args).await,
            "voted" => self.voted(args).await,
            "metrics" | "dashboard" => self.metrics().await,
            "audit" => self.audit(args).await,
            other => Err(ClientError::validation(format!("Unknown command '{}'. Type 'help' for commands.", other))),
        }
    }

    /// Navigates to `route`; returns a reply when the guard sent us elsewhere.
    fn enter(&mut self, route: Route) -> Option<Reply> {
        let landed = self.app.go(route.clone());
        if landed == route {
            return None;
        }
        let why = if landed == Route::Login { "sign in required" } else { "not permitted for your role" };
        Some(Reply::line(format!("-> {} ({})", landed, why)))
    }

    /// Poll id from the argument, else from the current route.
    fn poll_id(&self, arg: Option<&String>) -> ClientResult<String> {
        if let Some(id) = arg.map(|s| s.trim()).filter(|s| !s.is_empty()) {
            return Ok(id.to_string());
        }
        match self.app.current() {
            Route::PollDetail(id) | Route::PollEdit(id) | Route::PollResults(id) | Route::VoteStatus(id) => Ok(id.clone()),
            _ => Err(ClientError::validation("Specify a poll id")),
        }
    }

    fn status(&self) -> Reply {
        let session = self.app.session().snapshot();
        let mut r = Reply::default();
        r.push(format!("api: {}", self.app.config().api_base));
        r.push(format!("tokens: {}", self.app.config().token_file.display()));
        r.push(format!("session: {:?}", session.status()));
        if let Some(u) = &session.user {
            r.push(format!("user: {} ({})", u.email, u.role.label()));
        }
        r.push(format!("route: {}", self.app.current()));
        r.with_json(json!({
            "api": self.app.config().api_base,
            "session": format!("{:?}", session.status()),
            "user": session.user,
            "route": self.app.current().path(),
        }))
    }

    async fn login(&mut self, args: &[String]) -> ClientResult<Reply> {
        self.app.go(Route::Login);
        let req = LoginRequest::new(arg(args, 0), arg(args, 1));
        let user = self.app.auth().login(&req).await?;
        let landed = self.app.go(crate::router::LANDING);
        let mut r = Reply::toast(Toast::success(format!("Welcome, {}", user.display_name())));
        r.push(format!("signed in as {} ({})", user.email, user.role.label()));
        r.push(format!("-> {}", landed));
        Ok(r.with_json(json!({ "user": user })))
    }

    async fn logout(&mut self) -> ClientResult<Reply> {
        self.app.auth().logout().await;
        let landed = self.app.go(Route::Login);
        let mut r = Reply::toast(Toast::success("Signed out"));
        r.push(format!("-> {}", landed));
        Ok(r)
    }

    async fn register(&mut self, args: &[String]) -> ClientResult<Reply> {
        let slug = arg(args, 0);
        if let Some(r) = self.enter(Route::RegisterAs(slug.clone())) {
            return Ok(r);
        }
        let role = role_for_slug(&slug).ok_or_else(|| ClientError::validation("Choose a role: voter or poll-admin"))?;
        let req = RegisterRequest { email: arg(args, 1), password: arg(args, 2), confirm_password: arg(args, 3), role };
        let strength = password_strength(&req.password);
        let message = self.app.auth().register(&req).await?;
        let landed = self.app.go(Route::Login);
        let title = if message.is_empty() { "Account created".to_string() } else { message };
        let mut r = Reply::toast(Toast::success(title).with_description("You can now sign in."));
        r.push(format!("password strength: {}", strength));
        r.push(format!("-> {}", landed));
        Ok(r)
    }

    fn whoami(&mut self) -> ClientResult<Reply> {
        if let Some(r) = self.enter(Route::Profile) {
            return Ok(r);
        }
        let Some(user) = self.app.session().user() else { return Ok(Reply::line("not signed in")) };
        let mut r = Reply::default();
        r.push(format!("[{}] {}", initials(Some(&user)), user.display_name()));
        r.push(format!("email: {}", user.email));
        r.push(format!("role:  {}", user.role.label()));
        r.push(format!("id:    {}", user.id));
        if let Some(created) = &user.created_at {
            r.push(format!("member since {}", format_date(created)));
        }
        Ok(r.with_json(json!({ "user": user })))
    }

    fn goto(&mut self, args: &[String]) -> ClientResult<Reply> {
        let path = args.first().ok_or_else(|| ClientError::validation("usage: goto <path>"))?;
        let landed = self.app.navigate(path);
        let note = if let Route::NotFound(p) = &landed { format!(" (no page at {})", p) } else { String::new() };
        Ok(Reply::line(format!("-> {}{}", landed, note)))
    }

    async fn polls(&mut self, args: &[String]) -> ClientResult<Reply> {
        if let Some(r) = self.enter(Route::Polls) {
            return Ok(r);
        }
        let tab: PollTab = match args.first() {
            Some(t) => t.parse()?,
            None => PollTab::default(),
        };
        let user = self.app.session().user();
        if !PollTab::available(user.as_ref()).contains(&tab) {
            return Err(ClientError::validation(format!("The {} tab is not available", tab)));
        }
        let all = self.app.polls().list(None).await?;
        let shown = filter_polls(&all, tab);

        let mut table = Table::new(["ID", "Title", "Status", "Options", "Created"]);
        for p in &shown {
            let c = PollCard::from_poll(p);
            table.push([c.id, c.title, c.status, c.options.to_string(), c.created]);
        }
        let mut r = Reply::default();
        r.push(format!("{} polls ({})", tab, shown.len()));
        if shown.is_empty() {
            r.push("No polls here yet.");
        } else {
            r.table = Some(table);
        }
        Ok(r.with_json(json!({ "tab": tab.label(), "polls": shown })))
    }

    async fn load_detail(&self, id: &str) -> ClientResult<PollDetailView> {
        let poll = self.app.polls().get(id).await?;
        let vote = self.app.polls().vote_status(id).await.or_else(|e| if e.is_session_expired() { Err(e) } else { Ok(VoteStatus::default()) })?;
        Ok(PollDetailView::new(poll, vote, self.app.session().user().as_ref()))
    }

    async fn poll(&mut self, args: &[String]) -> ClientResult<Reply> {
        let id = self.poll_id(args.first())?;
        if let Some(r) = self.enter(Route::PollDetail(id.clone())) {
            return Ok(r);
        }
        let d = self.load_detail(&id).await?;
        let mut r = Reply::default();
        r.push(format!("{} · {}", d.headline(), d.poll.title));
        if let Some(desc) = d.poll.description.as_deref().filter(|s| !s.is_empty()) {
            r.push(desc.to_string());
        }
        for (i, o) in d.poll.options.iter().enumerate() {
            let mark = if d.vote.option_id.as_deref() == Some(o.id.as_str()) { "*" } else { " " };
            r.push(format!("{} {}. {}", mark, i + 1, o.option_text));
        }
        if d.can_vote() {
            r.push("vote <number> to cast your vote");
        } else if d.has_voted() {
            r.push("You have already voted. See `voted` or `results`.");
        }
        let actions: Vec<&str> = d.admin_actions().iter().map(|a| a.label()).collect();
        if !actions.is_empty() {
            r.push(format!("admin: {}", actions.join(", ")));
        }
        Ok(r.with_json(json!({ "poll": d.poll, "vote": d.vote, "can_vote": d.can_vote() })))
    }

    async fn create(&mut self, args: &[String]) -> ClientResult<Reply> {
        if let Some(r) = self.enter(Route::PollCreate) {
            return Ok(r);
        }
        let draft = parse_form(args).validate()?;
        let poll = self.app.polls().create(&draft).await?;
        self.app.go(Route::PollDetail(poll.id.clone()));
        let mut r = Reply::toast(Toast::success("Poll created").with_description("Saved as a draft. Publish it to open voting."));
        r.push(format!("-> {}", self.app.current()));
        Ok(r.with_json(json!({ "poll": poll })))
    }

    async fn edit(&mut self, args: &[String]) -> ClientResult<Reply> {
        let (id, rest) = args.split_first().ok_or_else(|| ClientError::validation("usage: edit <id> [title] [option...]"))?;
        if let Some(r) = self.enter(Route::PollEdit(id.clone())) {
            return Ok(r);
        }
        let current = self.app.polls().get(id).await?;
        let draft = merge_form(PollForm::from_poll(&current), parse_form(rest)).validate()?;
        let poll = self.app.polls().update(id, &draft).await?;
        self.app.go(Route::PollDetail(poll.id.clone()));
        Ok(Reply::toast(Toast::success("Poll updated")).with_json(json!({ "poll": poll })))
    }

    async fn admin_action(&mut self, action: &str, args: &[String]) -> ClientResult<Reply> {
        let id = self.poll_id(args.first())?;
        if let Some(r) = self.enter(Route::PollDetail(id.clone())) {
            return Ok(r);
        }
        if let GuardDecision::Redirect(_) = check_access(&self.app.session().snapshot(), RouteAccess::Roles(Role::ADMINS)) {
            return Err(ClientError::validation("Only poll admins can do that"));
        }
        let reply = match action {
            "publish" => {
                let poll = self.app.polls().publish(&id).await?;
                Reply::toast(Toast::success("Poll published").with_description("Voting is now open.")).with_json(json!({ "poll": poll }))
            }
            "close" => {
                let poll = self.app.polls().close(&id).await?;
                Reply::toast(Toast::success("Poll closed").with_description("Final results are available.")).with_json(json!({ "poll": poll }))
            }
            _ => {
                let message = self.app.polls().delete(&id).await?;
                self.app.go(Route::Polls);
                let mut r = Reply::toast(Toast::success("Poll deleted").with_description("The poll has been permanently removed."));
                r.push(format!("-> {}", self.app.current()));
                r.with_json(json!({ "message": message }))
            }
        };
        Ok(reply)
    }

    async fn vote(&mut self, args: &[String]) -> ClientResult<Reply> {
        // `vote <choice>` on a poll page, or `vote <id> <choice>`
        let (id, choice) = match args {
            [id, choice, ..] => (id.clone(), Some(choice.as_str())),
            [choice] => (self.poll_id(None)?, Some(choice.as_str())),
            [] => (self.poll_id(None)?, None),
        };
        if let Some(r) = self.enter(Route::PollDetail(id.clone())) {
            return Ok(r);
        }
        let d = self.load_detail(&id).await?;
        if d.has_voted() {
            return Err(ClientError::validation("You have already voted in this poll"));
        }
        if !d.can_vote() {
            return Err(ClientError::validation("This poll is not accepting votes"));
        }
        let option_id = d.select_option(choice)?;
        let receipt = self.app.polls().vote(&id, &option_id).await?;
        self.app.go(Route::VoteStatus(id));
        let mut r = Reply::toast(Toast::success("Vote submitted!").with_description("Your vote has been recorded successfully."));
        r.push(format!("-> {}", self.app.current()));
        Ok(r.with_json(json!({ "receipt": receipt })))
    }

    async fn results(&mut self, args: &[String]) -> ClientResult<Reply> {
        let (flags, positional) = split_flags(args);
        let id = self.poll_id(positional.first())?;
        if let Some(r) = self.enter(Route::PollResults(id.clone())) {
            return Ok(r);
        }
        let results: PollResults = self.app.polls().results(&id).await?;
        let poll: Option<Poll> = match self.app.polls().get(&id).await {
            Ok(p) => Some(p),
            Err(e) if e.is_session_expired() => return Err(e),
            Err(e) => {
                warn!("poll details unavailable for results: {}", e);
                None
            }
        };
        let view = ResultsView::build(&results, poll.as_ref());

        if let Some(target) = flags.get("csv") {
            let path = target.clone().map(PathBuf::from).unwrap_or_else(|| PathBuf::from(view.csv_file_name()));
            std::fs::write(&path, view.to_csv())?;
            return Ok(Reply::toast(Toast::success(format!("Exported {}", path.display()))));
        }

        let mut r = Reply::default();
        r.push(format!("{} · {}", view.title, view.headline));
        r.push(format!("{} votes", view.total_votes));
        let mut table = Table::new(["#", "Option", "Votes", "Share", ""]);
        for row in &view.rows {
            let name = if row.is_winner { format!("{} (winner)", row.option_text) } else { row.option_text.clone() };
            table.push([row.rank.to_string(), name, row.votes.to_string(), percent_label(row.percentage), bar(row.bar_width)]);
        }
        r.table = Some(table);
        r.footer.push(view.footer());
        Ok(r.with_json(json!({ "results": results, "title": view.title, "status": view.status_label })))
    }

    async fn voted(&mut self, args: &[String]) -> ClientResult<Reply> {
        let id = self.poll_id(args.first())?;
        if let Some(r) = self.enter(Route::VoteStatus(id.clone())) {
            return Ok(r);
        }
        let status = self.app.polls().vote_status(&id).await?;
        if !status.has_voted {
            return Ok(Reply::line("No vote found for this poll"));
        }
        let poll = self.app.polls().get(&id).await.ok();
        let receipt = VoteReceiptView::new(poll.as_ref(), &status);
        let mut r = Reply::line("Vote Submitted");
        if let Some(p) = &poll {
            r.push(format!("poll:      {}", p.title));
        }
        if let Some(o) = receipt.voted_option() {
            r.push(format!("selection: {}", o.option_text));
        }
        if let Some(v) = receipt.vote_ref() {
            r.push(format!("vote id:   {}", v));
        }
        if let (Some(d), Some(t)) = (receipt.voted_date(), receipt.voted_time()) {
            r.push(format!("when:      {} {}", d, t));
        }
        r.push("status:    VERIFIED");
        Ok(r.with_json(json!({ "vote": status })))
    }

    async fn metrics(&mut self) -> ClientResult<Reply> {
        if let Some(r) = self.enter(Route::Admin) {
            return Ok(r);
        }
        let Some(user) = self.app.session().user() else { return Err(ClientError::SessionExpired) };
        let stats = if uses_server_metrics(user.role) {
            DashboardStats::from_metrics(&self.app.admin().metrics().await?)
        } else {
            DashboardStats::from_polls(&self.app.polls().list(None).await?)
        };
        let mut r = Reply::line(dashboard_title(user.role));
        let mut table = Table::new(["Metric", "Value"]);
        if let Some(users) = stats.total_users {
            table.push(["Users".to_string(), users.to_string()]);
        }
        table.push(["Polls".to_string(), stats.total_polls.to_string()]);
        table.push(["Active".to_string(), stats.active_polls.to_string()]);
        table.push(["Closed".to_string(), stats.closed_polls.to_string()]);
        table.push(["Votes".to_string(), stats.total_votes.to_string()]);
        r.table = Some(table);
        Ok(r.with_json(json!({
            "total_polls": stats.total_polls,
            "active_polls": stats.active_polls,
            "closed_polls": stats.closed_polls,
            "total_votes": stats.total_votes,
            "total_users": stats.total_users,
        })))
    }

    async fn audit(&mut self, args: &[String]) -> ClientResult<Reply> {
        if let Some(r) = self.enter(Route::AuditLogs) {
            return Ok(r);
        }
        let (flags, positional) = split_flags(args);
        let (page, search) = match positional.split_first() {
            Some((first, rest)) if first.parse::<u64>().is_ok() => (first.parse::<u64>().unwrap_or(1), rest.join(" ")),
            _ => (1, positional.join(" ")),
        };
        let offset = Pagination::offset_for_page(page);
        let data = self.app.admin().audit_logs(Some(AUDIT_PAGE_SIZE), Some(offset)).await?;
        let filter = AuditFilter::new(search).with_action(flags.get("action").cloned().flatten());
        let shown = filter.apply(&data.logs);

        if let Some(target) = flags.get("csv") {
            let Some(csv) = audit_csv(&shown) else { return Ok(Reply::line("Nothing to export")) };
            let path = target.clone().map(PathBuf::from).unwrap_or_else(|| PathBuf::from(AUDIT_CSV_FILE));
            std::fs::write(&path, csv)?;
            return Ok(Reply::toast(Toast::success(format!("Exported {}", path.display()))));
        }

        let mut table = Table::new(["Timestamp", "User", "Action", "Resource", "Result"]);
        for l in &shown {
            table.push([
                format_timestamp(&l.created_at),
                l.actor_user_id.clone().unwrap_or_else(|| "Unknown".into()),
                l.action.clone(),
                resource_label(l),
                result_label(&l.action).to_string(),
            ]);
        }
        let pages = Pagination::new(offset, data.total);
        let mut r = Reply::line("Audit Logs");
        if shown.is_empty() {
            r.push("No matching log entries.");
        } else {
            r.table = Some(table);
        }
        r.footer.push(pages.summary());
        r.footer.push(format!("page {} of {} · actions: {}", pages.current_page(), pages.total_pages().max(1), distinct_actions(&data.logs).join(", ")));
        Ok(r.with_json(json!({ "logs": shown, "total": data.total, "offset": offset, "limit": AUDIT_PAGE_SIZE })))
    }

    /// Print a reply in the configured output mode.
    pub fn render(&self, reply: &Reply) {
        if self.output == OutputMode::Json {
            if let Some(v) = &reply.json {
                print_json(v);
                return;
            }
        }
        for l in &reply.lines {
            println!("{}", l);
        }
        if let Some(t) = &reply.table {
            print_table(t);
        }
        for l in &reply.footer {
            println!("{}", l);
        }
    }

    /// Prompt loop over stdin. Returns when the user quits or input ends.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut input = String::new();
        println!("nexus polling shell. Type 'help' for commands.");
        loop {
            input.clear();
            print!("{}> ", self.app.current());
            let _ = stdout.flush();
            if stdin.lock().read_line(&mut input)? == 0 {
                break;
            }
            let line = input.trim();
            if line.is_empty() {
                continue;
            }
            let reply = self.execute(line).await;
            self.render(&reply);
            if reply.quit {
                break;
            }
        }
        Ok(())
    }
}

fn failure_title(cmd: &str) -> String {
    match cmd {
        "login" => "Login failed".into(),
        "register" => "Registration failed".into(),
        "vote" => "Vote failed".into(),
        "create" => "Failed to create poll".into(),
        "edit" => "Failed to update poll".into(),
        "delete" => "Failed to delete poll".into(),
        other => format!("{} failed", other),
    }
}

fn arg(args: &[String], idx: usize) -> String { args.get(idx).cloned().unwrap_or_default() }

fn bar(width: f64) -> String { "#".repeat((width / 5.0).round() as usize) }

/// `<title> <option>... [--desc <text>]` into a poll form.
fn parse_form(args: &[String]) -> PollForm {
    let mut form = PollForm { options: Vec::new(), ..PollForm::default() };
    let mut it = args.iter();
    let mut title_seen = false;
    while let Some(a) = it.next() {
        if a == "--desc" {
            form.description = it.next().cloned().unwrap_or_default();
        } else if !title_seen {
            form.title = a.clone();
            title_seen = true;
        } else {
            form.add_option();
            let idx = form.options.len() - 1;
            form.update_option(idx, a);
        }
    }
    form
}

/// Fields given on the command line replace the prefilled ones; omitted fields keep their values.
fn merge_form(mut base: PollForm, edits: PollForm) -> PollForm {
    if !edits.title.trim().is_empty() {
        base.title = edits.title;
    }
    if !edits.description.trim().is_empty() {
        base.description = edits.description;
    }
    if !edits.options.is_empty() {
        base.options = edits.options;
    }
    base
}

/// Pull `--name [value]` flags out of an argument list. A flag followed by another flag
/// (or nothing) has no value.
fn split_flags(args: &[String]) -> (std::collections::HashMap<String, Option<String>>, Vec<String>) {
    let mut flags = std::collections::HashMap::new();
    let mut positional = Vec::new();
    let mut i = 0;
    while i < args.len() {
        if let Some(name) = args[i].strip_prefix("--") {
            let value = args.get(i + 1).filter(|v| !v.starts_with("--")).cloned();
            i += if value.is_some() { 2 } else { 1 };
            flags.insert(name.to_string(), value);
        } else {
            positional.push(args[i].clone());
            i += 1;
        }
    }
    (flags, positional)
}

/// Whitespace-separated words; double quotes group words and `\"` escapes a quote.
pub fn split_args(line: &str) -> ClientResult<Vec<String>> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;
    let mut has_token = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'"') => {
                cur.push('"');
                chars.next();
                has_token = true;
            }
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    out.push(std::mem::take(&mut cur));
                    has_token = false;
                }
            }
            c => {
                cur.push(c);
                has_token = true;
            }
        }
    }
    if in_quotes {
        return Err(ClientError::validation("Unterminated quote"));
    }
    if has_token {
        out.push(cur);
    }
    Ok(out)
}
