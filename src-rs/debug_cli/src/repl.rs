use std::io;

use marine_hub::helpers::parse_flag;
use serde_json::{json, Value};

use crate::client::HTTPClient;
use crate::models::{CLIConfig, JobInfo, QueueName};
use crate::render;

pub struct REPL {
    pub config: CLIConfig,
    pub client: HTTPClient,
}

impl REPL {
    pub fn new(config: CLIConfig, client: HTTPClient) -> Self {
        Self { config, client }
    }

    pub fn run(&mut self) {
        render::banner(&self.config);
        loop {
            render::prompt();
            let mut line = String::new();
            match io::stdin().read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            if !line.starts_with('/') {
                render::info("commands start with '/', type /help");
                continue;
            }
            if self.handle_command(&line) {
                break;
            }
        }
    }

    fn handle_command(&mut self, line: &str) -> bool {
        let mut parts = line.splitn(2, ' ');
        let cmd = parts.next().unwrap_or("").trim_start_matches('/');
        let rest = parts.next().unwrap_or("").trim();
        let args: Vec<&str> = rest.split_whitespace().collect();
        match cmd {
            "exit" | "quit" => return true,
            "help" => render::help(),
            "list" | "ls" => self.with_queue(&args, |repl, queue, _| {
                match repl.client.list(queue) {
                    Ok(listing) => render::listing(queue, &listing),
                    Err(err) => render::error(&err),
                }
            }),
            "add" => self.with_queue(&args, |repl, queue, rest| repl.add(queue, rest)),
            "advance" => self.with_queue(&args, |repl, queue, rest| {
                let (id, delta) = match (rest.first(), rest.get(1).and_then(|d| d.parse::<u32>().ok())) {
                    (Some(id), Some(delta)) => (*id, delta),
                    _ => return render::error("usage: /advance <queue> <id> <delta>"),
                };
                let result = repl
                    .client
                    .job_action(queue, id, "advance", Some(json!({ "delta": delta })));
                repl.show_job(result);
            }),
            "fail" => self.with_queue(&args, |repl, queue, rest| {
                if rest.len() < 2 {
                    return render::error("usage: /fail <queue> <id> <reason>");
                }
                let reason = rest[1..].join(" ");
                let result = repl
                    .client
                    .job_action(queue, rest[0], "fail", Some(json!({ "error": reason })));
                repl.show_job(result);
            }),
            "retry" => self.with_queue(&args, |repl, queue, rest| match rest.first() {
                Some(id) => {
                    let result = repl.client.job_action(queue, id, "retry", None);
                    repl.show_job(result);
                }
                None => render::error("usage: /retry <queue> <id>"),
            }),
            "remove" | "rm" => self.with_queue(&args, |repl, queue, rest| match rest.first() {
                Some(id) => {
                    let result = repl.client.remove(queue, id);
                    repl.show_job(result);
                }
                None => render::error("usage: /remove <queue> <id>"),
            }),
            "start" => self.with_queue(&args, |repl, queue, rest| match rest.first() {
                Some(id) => {
                    let result = repl.client.start(queue, id);
                    repl.show_value(result);
                }
                None => render::error("usage: /start <queue> <id>"),
            }),
            "process" => self.with_queue(&args, |repl, queue, rest| {
                let ids = rest.iter().map(|id| id.to_string()).collect();
                let result = repl.client.process(queue, ids);
                repl.show_value(result);
            }),
            "clear" => self.with_queue(&args, |repl, queue, rest| {
                let scope = rest.first().copied().unwrap_or("completed");
                let result = repl.client.clear(queue, scope);
                repl.show_value(result);
            }),
            "pause" => self.with_queue(&args, |repl, queue, _| {
                let result = repl.client.set_paused(queue, true);
                repl.show_value(result);
            }),
            "resume" => self.with_queue(&args, |repl, queue, _| {
                let result = repl.client.set_paused(queue, false);
                repl.show_value(result);
            }),
            "health" => {
                let result = self.client.health();
                self.show_value(result);
            }
            "debug" => {
                if rest.is_empty() {
                    self.config.debug = !self.config.debug;
                    render::info(&format!("debug: {}", self.config.debug));
                } else if let Some(flag) = parse_flag(rest) {
                    self.config.debug = flag;
                    render::info(&format!("debug: {}", self.config.debug));
                } else {
                    render::error("invalid debug flag");
                }
            }
            "config" => render::config(&self.config),
            "base" => {
                if rest.is_empty() {
                    render::info(&format!("base: {}", self.config.base_url));
                } else {
                    self.config.base_url = rest.to_string();
                    self.client = HTTPClient::new(&self.config.base_url, self.config.token.clone());
                    render::info("base url updated");
                }
            }
            "token" => {
                if rest.is_empty() {
                    self.config.token = None;
                    render::info("token cleared");
                } else {
                    self.config.token = Some(rest.to_string());
                    render::info("token updated");
                }
                self.client = HTTPClient::new(&self.config.base_url, self.config.token.clone());
            }
            _ => render::info("unknown command, type /help"),
        }
        false
    }

    fn with_queue<F>(&mut self, args: &[&str], run: F)
    where
        F: FnOnce(&mut Self, QueueName, &[&str]),
    {
        match args.first().and_then(|raw| QueueName::parse(raw)) {
            Some(queue) => run(self, queue, &args[1..]),
            None => render::error("expected a queue: exports | ingestion | classifications"),
        }
    }

    fn add(&mut self, queue: QueueName, rest: &[&str]) {
        let body = match (queue, rest) {
            (QueueName::Exports, [name, format, ..]) => json!({ "name": name, "format": format }),
            (QueueName::Ingestion, [name]) => json!({ "name": name }),
            (QueueName::Ingestion, [name, size, ..]) => match size.parse::<u64>() {
                Ok(size) => json!({ "name": name, "size_bytes": size }),
                Err(_) => return render::error("size must be a number of bytes"),
            },
            (QueueName::Classifications, [name, kind, ..]) => {
                json!({ "name": name, "sample_kind": kind })
            }
            _ => return render::error("missing arguments, type /help"),
        };
        let result = self.client.enqueue(queue, body);
        self.show_job(result);
    }

    fn show_job(&self, result: Result<JobInfo, String>) {
        match result {
            Ok(job) => render::job(&job),
            Err(err) => render::error(&err),
        }
    }

    fn show_value(&self, result: Result<Value, String>) {
        match result {
            Ok(value) if self.config.debug => render::raw(&value),
            Ok(value) => render::info(&value.to_string()),
            Err(err) => render::error(&err),
        }
    }
}
