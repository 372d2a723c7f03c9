//! One client's sidebar.
//!
//! # Lifecycle
//!
//! ```text
//! create() ──→ [Created] ──→ objective + display sent ──→ [Active]
//!                                                            │
//!                               update_title / update_line(s) / remove_line
//!                                                            │
//!                                                        delete()
//!                                                            ▼
//!                                                        [Deleted]
//! ```
//!
//! Every line change goes through one diff against the previous lines, so
//! only the scores and teams that actually changed are sent.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tallyboard_protocol::{Era, LEGACY_LINE_LIMIT, LEGACY_TITLE_LIMIT, Packet, ProtocolError};
use tallyboard_transport::ClientId;

use crate::messages::{Messages, ObjectiveMode, ScoreAction, TeamMode};
use crate::{PacketLayer, SessionConfig, SessionError, id, split_line};

/// Where a sidebar is in its lifecycle. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarStatus {
    /// The id is allocated but the objective isn't shown yet.
    Created,
    /// The sidebar is on the client's screen.
    Active,
    /// Torn down. Every further operation fails.
    Deleted,
}

impl fmt::Display for SidebarStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "Created"),
            Self::Active => write!(f, "Active"),
            Self::Deleted => write!(f, "Deleted"),
        }
    }
}

#[derive(Debug)]
struct SidebarState {
    title: String,
    /// Index 0 is the top row.
    lines: Vec<String>,
    status: SidebarStatus,
}

/// A scoreboard sidebar shown to one client.
///
/// Safe to share between threads. Each operation holds the session's lock
/// for its whole read-diff-send sequence, so operations on one session
/// never interleave.
pub struct ScoreboardSession {
    id: String,
    client: ClientId,
    layer: Arc<PacketLayer>,
    config: SessionConfig,
    state: Mutex<SidebarState>,
}

impl ScoreboardSession {
    /// Creates a sidebar for `client` and shows it with an empty title.
    ///
    /// # Errors
    /// [`SessionError::OperationFailed`] if the objective or display
    /// packet can't be built or sent.
    pub fn create(
        layer: Arc<PacketLayer>,
        client: ClientId,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let session = Self {
            id: id::next_session_id(),
            client,
            layer,
            config,
            state: Mutex::new(SidebarState {
                title: String::new(),
                lines: Vec::new(),
                status: SidebarStatus::Created,
            }),
        };

        let messages = session.messages();
        session.deliver(
            "create objective",
            messages.objective(&session.id, ObjectiveMode::Create, ""),
        )?;
        session.deliver("display objective", messages.display_objective(&session.id))?;
        session.lock().status = SidebarStatus::Active;

        tracing::info!(id = %session.id, %client, era = %session.era(), "sidebar created");
        Ok(session)
    }

    // -- Accessors --------------------------------------------------------

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn client(&self) -> ClientId {
        self.client
    }

    pub fn era(&self) -> Era {
        self.layer.era()
    }

    pub fn title(&self) -> String {
        self.lock().title.clone()
    }

    /// A snapshot of the lines, top row first.
    pub fn lines(&self) -> Vec<String> {
        self.lock().lines.clone()
    }

    /// The line at `index`.
    ///
    /// # Errors
    /// [`SessionError::LineOutOfRange`] past the last line.
    pub fn line(&self, index: usize) -> Result<String, SessionError> {
        let state = self.lock();
        state
            .lines
            .get(index)
            .cloned()
            .ok_or(SessionError::LineOutOfRange {
                index,
                len: state.lines.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.lock().lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().lines.is_empty()
    }

    pub fn status(&self) -> SidebarStatus {
        self.lock().status
    }

    pub fn is_deleted(&self) -> bool {
        self.status() == SidebarStatus::Deleted
    }

    // -- Mutations --------------------------------------------------------

    /// Changes the title. Setting the current title again sends nothing.
    ///
    /// # Errors
    /// - [`SessionError::Deleted`] after [`delete`](Self::delete)
    /// - [`SessionError::TitleTooLong`] over 32 characters where text is
    ///   limited
    pub fn update_title(&self, title: &str) -> Result<(), SessionError> {
        let mut state = self.lock();
        self.ensure_live(&state)?;
        if state.title == title {
            return Ok(());
        }

        let len = title.chars().count();
        if self.has_text_limits() && len > LEGACY_TITLE_LIMIT {
            return Err(SessionError::TitleTooLong {
                len,
                max: LEGACY_TITLE_LIMIT,
            });
        }

        state.title = title.to_string();
        self.deliver(
            "update title",
            self.messages().objective(&self.id, ObjectiveMode::Update, title),
        )
    }

    /// Sets the line at `index`. Past the end, the gap is filled with
    /// empty lines.
    ///
    /// # Errors
    /// [`SessionError::Deleted`], [`SessionError::LineTooLong`], or
    /// [`SessionError::TooManyLines`] if `index` is past the line capacity.
    /// Nothing is sent when validation fails.
    pub fn update_line(&self, index: usize, text: &str) -> Result<(), SessionError> {
        let mut state = self.lock();
        self.ensure_live(&state)?;

        let max = self.config.line_capacity();
        if index >= max {
            return Err(SessionError::TooManyLines {
                count: index.saturating_add(1),
                max,
            });
        }

        let mut lines = state.lines.clone();
        if index < lines.len() {
            lines[index] = text.to_string();
        } else {
            lines.resize(index, String::new());
            lines.push(text.to_string());
        }

        self.validate_lines(&lines)?;
        self.apply_lines(&mut state, lines)
    }

    /// Removes the line at `index`; lines below move up. Past the end this
    /// does nothing.
    ///
    /// # Errors
    /// [`SessionError::Deleted`].
    pub fn remove_line(&self, index: usize) -> Result<(), SessionError> {
        let mut state = self.lock();
        self.ensure_live(&state)?;
        if index >= state.lines.len() {
            return Ok(());
        }

        let mut lines = state.lines.clone();
        lines.remove(index);
        self.apply_lines(&mut state, lines)
    }

    /// Replaces every line.
    ///
    /// # Errors
    /// [`SessionError::Deleted`], [`SessionError::TooManyLines`] or
    /// [`SessionError::LineTooLong`]. Nothing is sent when validation fails.
    pub fn update_lines<I, S>(&self, lines: I) -> Result<(), SessionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        let mut state = self.lock();
        self.ensure_live(&state)?;

        self.validate_lines(&lines)?;
        self.apply_lines(&mut state, lines)
    }

    /// Removes every team and the objective from the client. Final.
    ///
    /// # Errors
    /// [`SessionError::Deleted`] if already deleted.
    pub fn delete(&self) -> Result<(), SessionError> {
        let mut state = self.lock();
        self.ensure_live(&state)?;

        let messages = self.messages();
        for score in 0..state.lines.len() {
            self.deliver(
                "remove team",
                messages.team(&self.id, score, TeamMode::Remove, "", ""),
            )?;
        }
        self.deliver(
            "remove objective",
            messages.objective(&self.id, ObjectiveMode::Remove, ""),
        )?;

        state.status = SidebarStatus::Deleted;
        tracing::info!(id = %self.id, client = %self.client, "sidebar deleted");
        Ok(())
    }

    // -- Internals --------------------------------------------------------

    fn lock(&self) -> MutexGuard<'_, SidebarState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn messages(&self) -> Messages<'_> {
        Messages::new(self.layer.registry())
    }

    fn has_text_limits(&self) -> bool {
        self.config.has_text_limits(self.era())
    }

    fn ensure_live(&self, state: &SidebarState) -> Result<(), SessionError> {
        if state.status == SidebarStatus::Deleted {
            return Err(SessionError::Deleted(self.id.clone()));
        }
        Ok(())
    }

    fn validate_lines(&self, lines: &[String]) -> Result<(), SessionError> {
        let max = self.config.line_capacity();
        if lines.len() > max {
            return Err(SessionError::TooManyLines {
                count: lines.len(),
                max,
            });
        }
        if self.has_text_limits() {
            for (index, line) in lines.iter().enumerate() {
                let len = line.chars().count();
                if len > LEGACY_LINE_LIMIT {
                    return Err(SessionError::LineTooLong {
                        index,
                        len,
                        max: LEGACY_LINE_LIMIT,
                    });
                }
            }
        }
        Ok(())
    }

    /// Stores `lines` and sends the difference from the previous lines.
    ///
    /// A line at index `i` has score `len - i - 1`, so the bottom row is
    /// always score 0 and growing or shrinking only touches the top.
    fn apply_lines(
        &self,
        state: &mut SidebarState,
        lines: Vec<String>,
    ) -> Result<(), SessionError> {
        const ACTION: &str = "update lines";

        let old = std::mem::replace(&mut state.lines, lines);
        let new = &state.lines;
        let messages = self.messages();

        for score in (new.len()..old.len()).rev() {
            self.deliver(ACTION, messages.team(&self.id, score, TeamMode::Remove, "", ""))?;
            self.deliver(ACTION, messages.score(&self.id, score, ScoreAction::Remove))?;
        }

        for score in old.len()..new.len() {
            self.deliver(ACTION, messages.score(&self.id, score, ScoreAction::Change))?;
            self.deliver(ACTION, messages.team(&self.id, score, TeamMode::Create, "", ""))?;
        }

        let mut changed = 0;
        for score in 0..new.len() {
            let line = line_by_score(new, score);
            if line_by_score(&old, score) != line {
                let (prefix, suffix) = line.map_or_else(Default::default, |line| {
                    split_line(line, self.era().affix_limit())
                });
                self.deliver(
                    ACTION,
                    messages.team(&self.id, score, TeamMode::Update, &prefix, &suffix),
                )?;
                changed += 1;
            }
        }

        tracing::debug!(
            id = %self.id,
            from = old.len(),
            to = new.len(),
            changed,
            "lines applied"
        );
        Ok(())
    }

    fn deliver(
        &self,
        action: &'static str,
        packet: Result<Packet, ProtocolError>,
    ) -> Result<(), SessionError> {
        let packet = packet.map_err(|e| SessionError::failed(action, e))?;
        self.layer
            .sender()
            .send(self.client, packet)
            .map_err(|e| SessionError::failed(action, e))
    }
}

fn line_by_score(lines: &[String], score: usize) -> Option<&str> {
    let index = lines.len().checked_sub(score + 1)?;
    lines.get(index).map(String::as_str)
}

impl fmt::Debug for ScoreboardSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoreboardSession")
            .field("id", &self.id)
            .field("client", &self.client)
            .field("state", &*self.lock())
            .finish()
    }
}
