//! Chat sessions with the wellness companion.
//!
//! A `ChatSession` owns its id and history bound; the transcript itself lives
//! in the store under that id, so separate sessions never share turns.

use super::run_blocking;
use crate::ai::{flows, FlowInvoker};
use crate::constants::{CHAT_FALLBACK, CHAT_GREETING};
use crate::db::WellnessStore;
use crate::errors::{AppError, AppResult};
use crate::models::ChatMessage;
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct ChatSession {
    session_id: String,
    history_limit: usize,
    store: Arc<dyn WellnessStore>,
    invoker: FlowInvoker,
}

impl ChatSession {
    /// Opens a session, recording the greeting if the transcript is empty.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the transcript cannot be read or written.
    pub async fn open(
        store: Arc<dyn WellnessStore>,
        invoker: FlowInvoker,
        session_id: impl Into<String>,
        history_limit: usize,
    ) -> AppResult<Self> {
        let session = Self {
            session_id: session_id.into(),
            history_limit,
            store,
            invoker,
        };

        let existing = session.history().await?;
        if existing.is_empty() {
            let id = session.session_id.clone();
            run_blocking(&session.store, move |s| {
                s.append_chat_message(&id, &ChatMessage::assistant(CHAT_GREETING))
            })
            .await?;
            info!("Started chat session {}", session.session_id);
        } else {
            info!(
                "Resumed chat session {} with {} turns",
                session.session_id,
                existing.len()
            );
        }
        Ok(session)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// The most recent turns, oldest first.
    pub async fn history(&self) -> AppResult<Vec<ChatMessage>> {
        let id = self.session_id.clone();
        let limit = self.history_limit;
        run_blocking(&self.store, move |s| s.chat_history(&id, limit)).await
    }

    /// Records the user's message and returns the assistant's reply.
    ///
    /// If the model cannot answer, a fixed apology is returned as the
    /// assistant message and is not recorded.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for a blank message, or a storage error.
    pub async fn send_message(&self, message: &str) -> AppResult<ChatMessage> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::Validation("Message cannot be empty".to_string()));
        }

        let history = self.history().await?;
        let id = self.session_id.clone();
        let turn = ChatMessage::user(message);
        run_blocking(&self.store, move |s| s.append_chat_message(&id, &turn)).await?;

        debug!("Sending message with {} prior turns", history.len());
        match flows::wellness_conversation(&self.invoker, message, &history).await {
            Ok(response) => {
                let reply = ChatMessage::assistant(response);
                let id = self.session_id.clone();
                let stored = reply.clone();
                run_blocking(&self.store, move |s| s.append_chat_message(&id, &stored)).await?;
                Ok(reply)
            }
            Err(e) => {
                warn!(error = %e, session = %self.session_id, "Chat turn failed, using fallback");
                Ok(ChatMessage::assistant(CHAT_FALLBACK))
            }
        }
    }

    /// Reads messages line by line until `quit`, `exit` or an empty line,
    /// writing each reply to `output`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if reading or writing fails, or a storage error.
    pub async fn converse<R: BufRead, W: Write>(&self, mut input: R, output: &mut W) -> AppResult<()> {
        if let Some(last) = self.history().await?.last() {
            writeln!(output, "Assistant: {}", last.content)?;
        }
        writeln!(output, "(type 'quit' or 'exit', or press Enter on an empty line to leave)")?;

        loop {
            write!(output, "You: ")?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                break;
            }
            let line = line.trim();
            if line.is_empty() || line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
                break;
            }

            let reply = self.send_message(line).await?;
            writeln!(output, "Assistant: {}", reply.content)?;
        }

        writeln!(output, "Take care!")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::flow::{GenerationRequest, TextGenerator};
    use crate::db::MemoryStore;
    use crate::errors::AIError;
    use crate::models::Role;
    use async_trait::async_trait;
    use std::io::Cursor;
    use std::sync::Mutex;

    struct Replies {
        reply: Option<String>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TextGenerator for Replies {
        async fn generate(&self, request: &GenerationRequest) -> Result<String, AIError> {
            self.prompts.lock().unwrap().push(request.prompt.clone());
            self.reply.clone().ok_or(AIError::InvalidResponse("offline".to_string()))
        }
    }

    async fn session(reply: Option<&str>, id: &str) -> (ChatSession, Arc<Replies>, Arc<dyn WellnessStore>) {
        let replies = Arc::new(Replies {
            reply: reply.map(|r| format!(r#"{{"response":"{}"}}"#, r)),
            prompts: Mutex::new(Vec::new()),
        });
        let store: Arc<dyn WellnessStore> = Arc::new(MemoryStore::new());
        let invoker = FlowInvoker::with_builtin_catalog(replies.clone()).unwrap();
        let session = ChatSession::open(store.clone(), invoker, id, 20).await.unwrap();
        (session, replies, store)
    }

    #[tokio::test]
    async fn test_open_records_greeting_once() {
        let (session, replies, store) = session(Some("hi"), "s1").await;
        let history = session.history().await.unwrap();
        assert_eq!(history, vec![ChatMessage::assistant(CHAT_GREETING)]);

        let invoker = FlowInvoker::with_builtin_catalog(replies).unwrap();
        let again = ChatSession::open(store, invoker, "s1", 20).await.unwrap();
        assert_eq!(again.history().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_send_message_records_both_turns() {
        let (session, replies, _) = session(Some("That sounds hard."), "s1").await;
        let reply = session.send_message("  I had a rough day  ").await.unwrap();
        assert_eq!(reply, ChatMessage::assistant("That sounds hard."));

        let history = session.history().await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[1], ChatMessage::user("I had a rough day"));
        assert_eq!(history[2].role, Role::Assistant);

        let prompts = replies.prompts.lock().unwrap();
        assert!(prompts[0].contains("assistant: Hello!"));
        assert!(prompts[0].contains("User Message: I had a rough day"));
    }

    #[tokio::test]
    async fn test_failed_turn_returns_fallback_unrecorded() {
        let (session, _, _) = session(None, "s1").await;
        let reply = session.send_message("hello?").await.unwrap();
        assert_eq!(reply.content, CHAT_FALLBACK);

        let history = session.history().await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1], ChatMessage::user("hello?"));
    }

    #[tokio::test]
    async fn test_blank_message_rejected() {
        let (session, replies, _) = session(Some("unused"), "s1").await;
        let err = session.send_message("   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(replies.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sessions_do_not_share_history() {
        let (first, replies, store) = session(Some("ok"), "a").await;
        first.send_message("only in a").await.unwrap();

        let invoker = FlowInvoker::with_builtin_catalog(replies).unwrap();
        let second = ChatSession::open(store, invoker, "b", 20).await.unwrap();
        assert_eq!(second.history().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_converse_stops_on_quit() {
        let (session, replies, _) = session(Some("Glad to hear it."), "s1").await;
        let input = Cursor::new("I feel better\nquit\nnever sent\n");
        let mut output = Vec::new();
        session.converse(input, &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains(CHAT_GREETING));
        assert!(text.contains("Assistant: Glad to hear it."));
        assert_eq!(replies.prompts.lock().unwrap().len(), 1);
    }
}
