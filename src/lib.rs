extern crate irc;
#[macro_use]
extern crate lazy_static;
extern crate regex;
extern crate time;

use std::sync::Mutex;
use irc::client::prelude::*;
use irc::error;
use irc::proto::Command::{JOIN, PRIVMSG};
use regex::Regex;
use time::{Timespec, get_time};

/// Joins older than this no longer earn the invite hint.
const HINT_WINDOW_SECS: i64 = 60 * 60;

const FAQ_HINT: &'static str = "If you would like an invite to lobste.rs, please look at the \
                                chat FAQ first. https://lobste.rs/about#chat";

lazy_static! {
    static ref INVITE_RE: Regex = Regex::new(r"(?i)\binvite\b").unwrap();
    static ref JOINS: Mutex<data::Joins> = Mutex::new(data::Joins::new());
}

#[no_mangle]
pub extern fn process(server: &IrcServer, message: &Message) -> error::Result<()> {
    process_internal(server, message)
}

pub fn process_internal<S>(server: &S, msg: &Message) -> error::Result<()> where S: ServerExt {
    process_at(server, msg, get_time())
}

pub fn process_at<S>(server: &S, msg: &Message, now: Timespec) -> error::Result<()>
    where S: ServerExt {
    let user = msg.source_nickname().unwrap_or("");
    match msg.command {
        JOIN(..) => {
            if !user.is_empty() {
                JOINS.lock().unwrap().record(user, now);
            }
        }
        PRIVMSG(ref chan, ref text) => {
            if INVITE_RE.is_match(text) {
                let replyto = if chan == server.config().nickname() {
                    user
                } else {
                    &chan[..]
                };
                if JOINS.lock().unwrap().joined_within(user, HINT_WINDOW_SECS, now) {
                    server.send_privmsg(replyto, &format!("{}: {}", user, FAQ_HINT))?;
                }
            }
        }
        _ => (),
    }
    Ok(())
}

mod data {
    use std::collections::HashMap;
    use time::Timespec;

    /// Last join time seen for each nickname. Nicknames are case-insensitive
    /// on IRC, so keys are lowercased.
    pub struct Joins {
        seen: HashMap<String, Timespec>,
    }

    impl Joins {
        pub fn new() -> Joins {
            Joins { seen: HashMap::new() }
        }

        /// Records a join, keeping the latest time seen. A stored time is
        /// never moved backwards.
        pub fn record(&mut self, nickname: &str, when: Timespec) {
            let entry = self.seen.entry(nickname.to_lowercase()).or_insert(when);
            if when > *entry {
                *entry = when;
            }
        }

        pub fn last_join(&self, nickname: &str) -> Option<Timespec> {
            self.seen.get(&nickname.to_lowercase()).map(|&t| t)
        }

        pub fn joined_within(&self, nickname: &str, window_secs: i64, now: Timespec) -> bool {
            match self.last_join(nickname) {
                Some(joined) => (now - joined).num_seconds() <= window_secs,
                None => false,
            }
        }
    }
}
