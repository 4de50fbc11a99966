//! Notifications emitted by a combat session.
//!
//! The engine only talks to an [`EventSink`]; how events are rendered,
//! buffered, or forwarded is up to the sink.

use crate::model::{Combatant, Side};
use serde::Serialize;
use serde_json::json;
use std::sync::mpsc::Sender;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatEndReason {
    PlayerFled,
    /// Declared for completeness; nothing in a session triggers it yet.
    RivalFled,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "reason")]
pub enum CombatState {
    Waiting,
    Busy,
    Ended(CombatEndReason),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CombatEvent {
    Log { text: String },
    State { state: CombatState },
    Snapshot { side: Side, combatant: Combatant },
    CombatEnd { reason: CombatEndReason },
}

pub trait EventSink {
    fn emit(&mut self, event: CombatEvent);
}

impl<F> EventSink for F
where
    F: FnMut(CombatEvent),
{
    fn emit(&mut self, event: CombatEvent) {
        self(event)
    }
}

/// Forwards events over a channel. A dropped receiver is ignored.
impl EventSink for Sender<CombatEvent> {
    fn emit(&mut self, event: CombatEvent) {
        let _ = self.send(event);
    }
}

/// Records every event in order.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Vec<CombatEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn log_lines(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                CombatEvent::Log { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn states(&self) -> Vec<CombatState> {
        self.events
            .iter()
            .filter_map(|event| match event {
                CombatEvent::State { state } => Some(*state),
                _ => None,
            })
            .collect()
    }

    pub fn last_snapshot(&self, side: Side) -> Option<&Combatant> {
        self.events.iter().rev().find_map(|event| match event {
            CombatEvent::Snapshot {
                side: snap_side,
                combatant,
            } if *snap_side == side => Some(combatant),
            _ => None,
        })
    }

    pub fn end_reason(&self) -> Option<CombatEndReason> {
        self.events.iter().find_map(|event| match event {
            CombatEvent::CombatEnd { reason } => Some(*reason),
            _ => None,
        })
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "log": self.log_lines(),
            "events": self.events,
        })
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: CombatEvent) {
        self.events.push(event);
    }
}

/// Mirrors events into `tracing` at info level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: CombatEvent) {
        match event {
            CombatEvent::Log { text } => tracing::info!(target: "combat", "{text}"),
            CombatEvent::State { state } => tracing::info!(target: "combat", ?state, "state"),
            CombatEvent::Snapshot { side, combatant } => tracing::info!(
                target: "combat",
                ?side,
                name = %combatant.name,
                hp = combatant.hp.current,
                max_hp = combatant.hp.total,
                "snapshot"
            ),
            CombatEvent::CombatEnd { reason } => {
                tracing::info!(target: "combat", ?reason, "combat ended")
            }
        }
    }
}

/// Sends every event to both sinks.
pub struct Tee<A, B>(pub A, pub B);

impl<A: EventSink, B: EventSink> EventSink for Tee<A, B> {
    fn emit(&mut self, event: CombatEvent) {
        self.0.emit(event.clone());
        self.1.emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BaseStats;
    use crate::types::Element;
    use std::sync::mpsc;

    fn snapshot(side: Side, hp: u32) -> CombatEvent {
        let mut combatant = Combatant::new(
            "Pidgey",
            5,
            &[Element::Normal, Element::Flying],
            BaseStats {
                hp: 20,
                attack: 10,
                defense: 10,
                special_attack: 10,
                special_defense: 10,
                speed: 12,
            },
        );
        combatant.hp.current = hp;
        CombatEvent::Snapshot { side, combatant }
    }

    #[test]
    fn event_log_queries() {
        let mut log = EventLog::new();
        log.emit(CombatEvent::State {
            state: CombatState::Waiting,
        });
        log.emit(snapshot(Side::Rival, 20));
        log.emit(CombatEvent::Log {
            text: "Dealt 3 damage".to_string(),
        });
        log.emit(snapshot(Side::Rival, 17));
        log.emit(CombatEvent::CombatEnd {
            reason: CombatEndReason::PlayerFled,
        });
        assert_eq!(log.log_lines(), vec!["Dealt 3 damage"]);
        assert_eq!(log.states(), vec![CombatState::Waiting]);
        assert_eq!(log.last_snapshot(Side::Rival).map(|c| c.hp.current), Some(17));
        assert!(log.last_snapshot(Side::Player).is_none());
        assert_eq!(log.end_reason(), Some(CombatEndReason::PlayerFled));
    }

    #[test]
    fn json_export_tags_events() {
        let mut log = EventLog::new();
        log.emit(CombatEvent::State {
            state: CombatState::Ended(CombatEndReason::PlayerFled),
        });
        log.emit(CombatEvent::Log {
            text: "Miss".to_string(),
        });
        let value = log.to_json();
        assert_eq!(value["log"][0], "Miss");
        assert_eq!(value["events"][0]["kind"], "state");
        assert_eq!(value["events"][0]["state"]["state"], "ended");
        assert_eq!(value["events"][0]["state"]["reason"], "player_fled");
        assert_eq!(value["events"][1]["text"], "Miss");
    }

    #[test]
    fn channel_and_closure_sinks() {
        let (tx, rx) = mpsc::channel();
        let mut sender = tx;
        sender.emit(CombatEvent::Log {
            text: "hello".to_string(),
        });
        assert_eq!(
            rx.recv().ok(),
            Some(CombatEvent::Log {
                text: "hello".to_string()
            })
        );

        let mut seen = 0;
        {
            let mut counter = |_event: CombatEvent| seen += 1;
            let mut tee = Tee(&mut counter, EventLog::new());
            tee.emit(CombatEvent::State {
                state: CombatState::Busy,
            });
            assert_eq!(tee.1.states(), vec![CombatState::Busy]);
        }
        assert_eq!(seen, 1);
    }
}
