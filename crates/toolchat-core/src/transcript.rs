//! Append-only conversation history.
//!
//! A `Transcript` starts with one system message and only ever grows. It remembers
//! which tool calls of the latest assistant message are still unanswered and refuses
//! appends that would leave the model looking at an unpaired call or result.

use std::collections::{HashSet, VecDeque};

use tracing::debug;

use crate::error::TranscriptError;
use crate::types::{Message, ToolCall};

#[derive(Clone, Debug)]
pub struct Transcript {
    messages: Vec<Message>,
    /// Ids of unanswered tool calls, in the order the model issued them.
    pending: VecDeque<String>,
}

impl Transcript {
    /// Start a transcript seeded with a system message.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
            pending: VecDeque::new(),
        }
    }

    /// Append a user message.
    pub fn push_user(&mut self, content: impl Into<String>) -> Result<(), TranscriptError> {
        self.ensure_settled()?;
        self.messages.push(Message::user(content));
        Ok(())
    }

    /// Append an assistant message. Its tool calls become pending until each one
    /// is answered by [`push_tool_result`](Self::push_tool_result).
    pub fn push_assistant(
        &mut self,
        content: Option<String>,
        tool_calls: Vec<ToolCall>,
    ) -> Result<(), TranscriptError> {
        self.ensure_settled()?;

        let mut seen = HashSet::new();
        for call in &tool_calls {
            if !seen.insert(call.id.as_str()) {
                return Err(TranscriptError::DuplicateToolCallId(call.id.clone()));
            }
        }

        self.pending = tool_calls.iter().map(|c| c.id.clone()).collect();
        let message = if tool_calls.is_empty() {
            Message::Assistant {
                content,
                tool_calls: None,
            }
        } else {
            Message::assistant_tool_calls(content, tool_calls)
        };
        self.messages.push(message);
        Ok(())
    }

    /// Append the result of the next pending tool call.
    pub fn push_tool_result(
        &mut self,
        tool_call_id: &str,
        name: &str,
        content: impl Into<String>,
    ) -> Result<(), TranscriptError> {
        match self.pending.front() {
            Some(expected) if expected == tool_call_id => {
                self.pending.pop_front();
            }
            other => {
                return Err(TranscriptError::UnexpectedToolResult {
                    expected: other.cloned(),
                    got: tool_call_id.to_string(),
                });
            }
        }
        self.messages
            .push(Message::tool_result(tool_call_id, name, content));
        debug!(tool_call_id, remaining = self.pending.len(), "tool result appended");
        Ok(())
    }

    /// Whether every tool call issued so far has its result.
    pub fn is_settled(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of tool calls still awaiting results.
    pub fn pending_calls(&self) -> usize {
        self.pending.len()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    fn ensure_settled(&self) -> Result<(), TranscriptError> {
        if self.pending.is_empty() {
            Ok(())
        } else {
            Err(TranscriptError::UnresolvedToolCalls(self.pending.len()))
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn calls(ids: &[&str]) -> Vec<ToolCall> {
        ids.iter()
            .map(|id| ToolCall::new(*id, "calculate", "{}"))
            .collect()
    }

    #[test]
    fn test_starts_with_system_message() {
        let t = Transcript::new("be brief");
        assert_eq!(t.len(), 1);
        assert_eq!(t.messages()[0], Message::system("be brief"));
        assert!(t.is_settled());
    }

    #[test]
    fn test_tool_results_must_follow_call_order() {
        let mut t = Transcript::new("sys");
        t.push_user("q").unwrap();
        t.push_assistant(None, calls(&["a", "b"])).unwrap();
        assert_eq!(t.pending_calls(), 2);

        let err = t.push_tool_result("b", "calculate", "x").unwrap_err();
        assert_eq!(
            err,
            TranscriptError::UnexpectedToolResult {
                expected: Some("a".into()),
                got: "b".into()
            }
        );

        t.push_tool_result("a", "calculate", "1").unwrap();
        t.push_tool_result("b", "calculate", "2").unwrap();
        assert!(t.is_settled());
        assert_eq!(t.len(), 5);
    }

    #[test]
    fn test_unknown_tool_result_rejected() {
        let mut t = Transcript::new("sys");
        let err = t.push_tool_result("ghost", "calculate", "x").unwrap_err();
        assert!(matches!(
            err,
            TranscriptError::UnexpectedToolResult { expected: None, .. }
        ));
    }

    #[test]
    fn test_no_new_turns_while_calls_pending() {
        let mut t = Transcript::new("sys");
        t.push_assistant(None, calls(&["a"])).unwrap();

        assert_eq!(
            t.push_user("next").unwrap_err(),
            TranscriptError::UnresolvedToolCalls(1)
        );
        assert_eq!(
            t.push_assistant(Some("done".into()), vec![]).unwrap_err(),
            TranscriptError::UnresolvedToolCalls(1)
        );
    }

    #[test]
    fn test_duplicate_call_ids_rejected() {
        let mut t = Transcript::new("sys");
        let err = t.push_assistant(None, calls(&["a", "a"])).unwrap_err();
        assert_eq!(err, TranscriptError::DuplicateToolCallId("a".into()));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_plain_assistant_message_has_no_tool_calls_field() {
        let mut t = Transcript::new("sys");
        t.push_user("hi").unwrap();
        t.push_assistant(Some("hello".into()), vec![]).unwrap();
        assert_eq!(t.last(), Some(&Message::assistant("hello")));
    }
}
