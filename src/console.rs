//! Line-oriented front end: the conversation list and the open thread,
//! driven only through the store's query and command surface.

use crate::api::client::ApiClient;
use crate::storage::Persistence;
use crate::store::{ConversationStore, Rejected};
use crate::utils::{block_on, format_time, initials};
use chrono::Utc;
use std::io::{self, Write};

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    List(String),
    Open(u64),
    Send(String),
    Stats,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        match word {
            "list" | "ls" => Ok(Command::List(rest.to_string())),
            "open" => rest
                .parse()
                .map(Command::Open)
                .map_err(|_| format!("not a conversation id: {:?}", rest)),
            "send" => Ok(Command::Send(rest.to_string())),
            "stats" => Ok(Command::Stats),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            "" => Err("type `help` for commands".to_string()),
            other => Err(format!("unknown command: {}", other)),
        }
    }
}

pub struct Console<P: Persistence, W: Write> {
    store: ConversationStore<P>,
    api: Option<ApiClient>,
    user_name: String,
    out: W,
}

impl<P: Persistence, W: Write> Console<P, W> {
    pub fn new(store: ConversationStore<P>, api: Option<ApiClient>, user_name: impl Into<String>, out: W) -> Self {
        Self {
            store,
            api,
            user_name: user_name.into(),
            out,
        }
    }

    pub fn store(&self) -> &ConversationStore<P> {
        &self.store
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Handles one input line. Returns `Ok(false)` once the user asks to quit.
    pub fn handle(&mut self, line: &str) -> io::Result<bool> {
        let cmd = match Command::parse(line) {
            Ok(cmd) => cmd,
            Err(msg) => {
                writeln!(self.out, "{}", msg)?;
                return Ok(true);
            }
        };
        match cmd {
            Command::List(term) => self.print_list(&term)?,
            Command::Open(id) => {
                if self.store.select(id).is_some() {
                    self.print_thread()?;
                } else {
                    writeln!(self.out, "no conversation {}", id)?;
                }
            }
            Command::Send(text) => self.send(&text)?,
            Command::Stats => self.print_stats()?,
            Command::Help => self.print_help()?,
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    fn print_list(&mut self, term: &str) -> io::Result<()> {
        let rows = self.store.list(term);
        if rows.is_empty() {
            writeln!(self.out, "no conversations match {:?}", term)?;
        }
        let now = Utc::now();
        let selected = self.store.selected_id();
        for row in rows {
            let marker = if selected == Some(row.id) { '>' } else { ' ' };
            let badge = if row.unread_count > 0 { format!(" [{}]", row.unread_count) } else { String::new() };
            let when = row.last_activity.map(|t| format_time(t, now)).unwrap_or_default();
            writeln!(
                self.out,
                "{} {:>2} {:<4} {} ({}){}  {}",
                marker,
                row.id,
                initials(&row.participant),
                row.participant,
                row.role,
                badge,
                when
            )?;
            writeln!(self.out, "          {}", row.preview)?;
        }
        Ok(())
    }

    fn print_thread(&mut self) -> io::Result<()> {
        let Some(conv) = self.store.selected() else {
            return writeln!(self.out, "no conversation open; use `open <id>`");
        };
        let now = Utc::now();
        writeln!(self.out, "-- {} · {}", conv.participant, conv.role)?;
        for msg in &conv.messages {
            let name = msg.sender.display_name(&self.user_name);
            let indent = if msg.is_own() { "    " } else { "" };
            writeln!(self.out, "{}[{}] {}: {}", indent, format_time(msg.timestamp, now), name, msg.content)?;
        }
        Ok(())
    }

    fn send(&mut self, text: &str) -> io::Result<()> {
        let Some(id) = self.store.selected_id() else {
            return writeln!(self.out, "no conversation open; use `open <id>`");
        };
        match self.store.send(id, text) {
            Ok(_) => self.print_thread(),
            Err(Rejected::EmptyMessage) => writeln!(self.out, "nothing to send"),
            Err(e) => writeln!(self.out, "{}", e),
        }
    }

    fn print_stats(&mut self) -> io::Result<()> {
        let Some(api) = &self.api else {
            return writeln!(self.out, "no API configured");
        };
        match block_on(api.dashboard_stats()) {
            Ok(resp) => {
                let s = resp.data;
                writeln!(
                    self.out,
                    "patients {}  appointments {}  records {}  staff {}",
                    s.total_patients, s.appointments, s.medical_records, s.total_staff
                )
            }
            Err(e) => writeln!(self.out, "Failed to load stats: {}", e),
        }
    }

    fn print_help(&mut self) -> io::Result<()> {
        writeln!(self.out, "list [term]   conversations, optionally filtered by name or role")?;
        writeln!(self.out, "open <id>     open a conversation and mark it read")?;
        writeln!(self.out, "send <text>   send to the open conversation")?;
        writeln!(self.out, "stats         dashboard totals from the API")?;
        writeln!(self.out, "quit")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn console() -> Console<MemoryStorage, Vec<u8>> {
        let store = ConversationStore::open(MemoryStorage::new());
        Console::new(store, None, "You", Vec::new())
    }

    fn output(console: Console<MemoryStorage, Vec<u8>>) -> String {
        String::from_utf8(console.into_output()).unwrap()
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse("list  cardio "), Ok(Command::List("cardio".into())));
        assert_eq!(Command::parse("ls"), Ok(Command::List(String::new())));
        assert_eq!(Command::parse("open 3"), Ok(Command::Open(3)));
        assert_eq!(Command::parse("send   see you at 10 "), Ok(Command::Send("see you at 10".into())));
        assert_eq!(Command::parse("exit"), Ok(Command::Quit));
        assert!(Command::parse("open three").is_err());
        assert!(Command::parse("delete 1").is_err());
    }

    #[test]
    fn list_shows_unread_badges() {
        let mut c = console();
        assert!(c.handle("list nurse").unwrap());
        let out = output(c);
        assert!(out.contains("Nurse Emma Wilson (Head Nurse) [1]"));
        assert!(!out.contains("Dr. Sarah Johnson"));
    }

    #[test]
    fn open_then_send_goes_to_selected_conversation() {
        let mut c = console();
        c.handle("send hello").unwrap();
        assert_eq!(c.store().conversation(1).unwrap().messages.len(), 6);

        c.handle("open 1").unwrap();
        assert_eq!(c.store().unread_count(1), 0);
        c.handle("send    ").unwrap();
        c.handle("send Thanks!").unwrap();
        let conv = c.store().conversation(1).unwrap();
        assert_eq!(conv.messages.len(), 7);
        assert_eq!(conv.last_message().unwrap().content, "Thanks!");

        let out = output(c);
        assert!(out.contains("no conversation open"));
        assert!(out.contains("nothing to send"));
        assert!(out.contains("You: Thanks!"));
    }

    #[test]
    fn quit_stops_and_unknown_open_reports() {
        let mut c = console();
        assert!(c.handle("open 12").unwrap());
        assert!(!c.handle("quit").unwrap());
        assert!(output(c).contains("no conversation 12"));
    }

    #[test]
    fn stats_without_api_is_reported() {
        let mut c = console();
        c.handle("stats").unwrap();
        assert!(output(c).contains("no API configured"));
    }
}
