pub mod chatlog;

pub use chatlog::{
    ChatSession, ChatTurn, Document, FlatRecord, RawRecord, SessionKey, UNKNOWN,
};
