/*
 * Copyright (c) 2003-2003-2023. Trevor Campbell and others.
 *
 * This file is part of Kelpie Flight Planner.
 *
 * Kelpie Flight Planner is free software; you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation; either version 2 of the License, or
 * (at your option) any later version.
 *
 * Kelpie Flight Planner is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Kelpie Flight Planner; if not, write to the Free Software
 * Foundation, Inc., 59 Temple Place, Suite 330, Boston, MA  02111-1307  USA
 *
 * Contributors:
 *      Trevor Campbell
 *
 */

#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::sync::RwLock;

use async_channel::{Receiver, Sender, TrySendError};
use log::warn;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum EventType {
    RouteChanged,
    ActiveLegChanged,
    RouteAltitudeChanged,
    RouteCalcStarted,
    RouteCalcFinished,
    StatusChange,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Event {
    RouteChanged { geometry_changed: bool, new_plan: bool },
    ActiveLegChanged(Option<usize>),
    RouteAltitudeChanged(i32),
    RouteCalcStarted,
    RouteCalcFinished { found: bool },
    StatusChange(String),
}

impl Event {
    fn event_type(&self) -> EventType {
        match self {
            Event::RouteChanged { .. } => EventType::RouteChanged,
            Event::ActiveLegChanged(_) => EventType::ActiveLegChanged,
            Event::RouteAltitudeChanged(_) => EventType::RouteAltitudeChanged,
            Event::RouteCalcStarted => EventType::RouteCalcStarted,
            Event::RouteCalcFinished { .. } => EventType::RouteCalcFinished,
            Event::StatusChange(_) => EventType::StatusChange,
        }
    }
}

/// Fans route events out to registered listeners.
#[derive(Default)]
pub struct EventManager {
    listeners: RwLock<HashMap<EventType, Vec<Sender<Event>>>>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    // Registers a listener for multiple `event_types`.
    // Returns a receiver that will receive copies of those events when notified.
    pub fn register_listener(&self, event_types: &[EventType]) -> Receiver<Event> {
        let (tx, rx) = async_channel::unbounded::<Event>();

        if let Ok(mut listeners) = self.listeners.write() {
            for event_type in event_types.iter().copied() {
                listeners.entry(event_type).or_default().push(tx.clone());
            }
        }
        rx
    }

    /// Notify only listeners registered for the specific `ev`. Never blocks.
    pub fn notify_listeners(&self, ev: Event) {
        let key = ev.event_type();

        let mut closed = false;
        if let Ok(listeners) = self.listeners.read() {
            if let Some(vec) = listeners.get(&key) {
                for listener in vec.iter() {
                    match listener.try_send(ev.clone()) {
                        Ok(_) => {}
                        Err(TrySendError::Closed(_)) => {
                            warn!("Listener channel closed");
                            closed = true;
                        }
                        Err(TrySendError::Full(_)) => {}
                    }
                }
            }
        }
        if closed {
            if let Ok(mut listeners) = self.listeners.write() {
                // Remove closed senders and remove empty vectors
                listeners.retain(|_, v| {
                    v.retain(|l| !l.is_closed());
                    !v.is_empty()
                });
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .map(|l| l.values().map(|v| v.len()).sum())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_channel::TryRecvError;

    #[test]
    fn test_notify_listeners() {
        let manager = EventManager::new();

        let receiver = manager.register_listener(&[EventType::RouteCalcStarted]);
        manager.notify_listeners(Event::RouteCalcStarted);

        match receiver.try_recv() {
            Ok(event) => assert_eq!(event, Event::RouteCalcStarted),
            Err(_) => panic!("Expected event not received"),
        }
    }

    #[test]
    fn test_only_registered_types() {
        let manager = EventManager::new();

        let receiver = manager.register_listener(&[EventType::RouteChanged, EventType::ActiveLegChanged]);
        manager.notify_listeners(Event::RouteAltitudeChanged(9000));
        manager.notify_listeners(Event::ActiveLegChanged(Some(3)));
        manager.notify_listeners(Event::RouteChanged {
            geometry_changed: true,
            new_plan: false,
        });

        assert_eq!(receiver.try_recv().ok(), Some(Event::ActiveLegChanged(Some(3))));
        assert_eq!(
            receiver.try_recv().ok(),
            Some(Event::RouteChanged {
                geometry_changed: true,
                new_plan: false
            })
        );
        assert!(matches!(receiver.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_notify_multiple_listeners() {
        let manager = EventManager::new();

        let receiver1 = manager.register_listener(&[EventType::RouteCalcFinished]);
        let receiver2 = manager.register_listener(&[EventType::RouteCalcFinished]);
        manager.notify_listeners(Event::RouteCalcFinished { found: true });

        match receiver1.try_recv() {
            Ok(event) => assert_eq!(event, Event::RouteCalcFinished { found: true }),
            Err(_) => panic!("Expected event not received by listener 1"),
        }

        match receiver2.try_recv() {
            Ok(event) => assert_eq!(event, Event::RouteCalcFinished { found: true }),
            Err(_) => panic!("Expected event not received by listener 2"),
        }
    }

    #[test]
    fn test_listener_channel_closed() {
        let manager = EventManager::new();

        let receiver = manager.register_listener(&[EventType::RouteChanged]);
        assert_eq!(manager.listener_count(), 1);
        drop(receiver); // Close the receiver

        manager.notify_listeners(Event::RouteChanged {
            geometry_changed: false,
            new_plan: true,
        });

        // Ensure no listeners are left
        assert_eq!(manager.listener_count(), 0);
    }

    #[test]
    fn test_listener_channel_full() {
        let manager = EventManager::new();

        let (tx, rx) = async_channel::bounded::<Event>(1);
        if let Ok(mut listeners) = manager.listeners.write() {
            listeners.entry(EventType::RouteAltitudeChanged).or_default().push(tx);
        }

        // Fill the channel
        manager.notify_listeners(Event::RouteAltitudeChanged(5000));
        manager.notify_listeners(Event::RouteAltitudeChanged(6000));

        match rx.try_recv() {
            Ok(event) => assert_eq!(event, Event::RouteAltitudeChanged(5000)),
            Err(_) => panic!("Expected event not received"),
        }

        // The second event should not be received because the channel is full
        match rx.try_recv() {
            Ok(_) => panic!("Unexpected event received"),
            Err(TryRecvError::Empty) => {}
            Err(_) => panic!("Unexpected error"),
        }
    }

    #[test]
    fn test_status_change_with_payload() {
        let manager = EventManager::new();

        let rx = manager.register_listener(&[EventType::StatusChange]);
        manager.notify_listeners(Event::StatusChange("No route found".to_string()));

        match rx.try_recv() {
            Ok(event) => match event {
                Event::StatusChange(s) => assert_eq!(s, "No route found"),
                _ => panic!("Wrong event variant"),
            },
            Err(_) => panic!("Expected status change event"),
        }
    }
}
