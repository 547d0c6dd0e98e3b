//! Publish/subscribe event bus with deferred delivery.
//!
//! Events are queued with [`EventBus::emit`] and delivered in FIFO order by
//! [`EventBus::process_events`]. Handlers receive a mutable context `C` (the
//! engine passes its `EngineContext`) and an [`Emitter`] for follow-up events.
//! Follow-up events are delivered on the next `process_events` call, never
//! within the pass that produced them.

use crate::events::event::Event;

/// Identifies a subscription for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u32);

/// Boxed event handler.
pub type Handler<C> = Box<dyn FnMut(&Event, &mut C, &mut Emitter<'_>)>;

/// Pending events, owned by the bus until delivered.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<Event>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    /// Append an event for the next delivery pass.
    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    fn take(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

/// Handed to handlers during delivery.
pub struct Emitter<'a> {
    queue: &'a mut EventQueue,
    cancelled: &'a mut Vec<SubscriptionId>,
}

impl Emitter<'_> {
    /// Queue an event; it is delivered on the next `process_events` call.
    pub fn emit(&mut self, event: Event) {
        self.queue.push(event);
    }

    /// Cancel a subscription. It receives nothing more, not even the rest of
    /// the current pass.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.cancelled.push(id);
    }
}

struct Subscription<C> {
    id: SubscriptionId,
    event_type: String,
    handler: Handler<C>,
    live: bool,
}

impl<C> Subscription<C> {
    fn matches(&self, event: &Event) -> bool {
        self.live && (self.event_type == Event::WILDCARD || self.event_type == event.type_tag())
    }
}

/// Event bus delivering events to handlers that take a context `C`.
pub struct EventBus<C> {
    subscriptions: Vec<Subscription<C>>,
    queue: EventQueue,
    next_id: u32,
}

impl<C> EventBus<C> {
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
            queue: EventQueue::new(),
            next_id: 1,
        }
    }

    /// Register a handler for every future event whose type tag matches.
    pub fn subscribe<F>(&mut self, event_type: impl Into<String>, handler: F) -> SubscriptionId
    where
        F: FnMut(&Event, &mut C, &mut Emitter<'_>) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            event_type: event_type.into(),
            handler: Box::new(handler),
            live: true,
        });
        id
    }

    /// Register a handler for every event regardless of type.
    pub fn subscribe_all<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&Event, &mut C, &mut Emitter<'_>) + 'static,
    {
        self.subscribe(Event::WILDCARD, handler)
    }

    /// Remove a subscription. No-op if it is already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscriptions.retain(|s| s.id != id);
    }

    /// Queue an event. No handler runs until `process_events`.
    pub fn emit(&mut self, event: Event) {
        self.queue.push(event);
    }

    /// The pending queue, for publishers that only need to append.
    pub fn queue_mut(&mut self) -> &mut EventQueue {
        &mut self.queue
    }

    /// Deliver one event right now, bypassing the queue.
    /// Events emitted by its handlers are queued as usual.
    pub fn dispatch_immediate(&mut self, event: &Event, ctx: &mut C) {
        self.dispatch(event, ctx);
        self.subscriptions.retain(|s| s.live);
    }

    /// Deliver every event queued before this call, in order.
    pub fn process_events(&mut self, ctx: &mut C) {
        let batch = self.queue.take();
        if batch.is_empty() {
            return;
        }
        for event in &batch {
            self.dispatch(event, ctx);
        }
        self.subscriptions.retain(|s| s.live);
        if !self.queue.is_empty() {
            log::debug!("{} follow-up events deferred to next pass", self.queue.len());
        }
    }

    fn dispatch(&mut self, event: &Event, ctx: &mut C) {
        let mut cancelled = Vec::new();
        for i in 0..self.subscriptions.len() {
            if !self.subscriptions[i].matches(event) {
                continue;
            }
            let mut emitter = Emitter {
                queue: &mut self.queue,
                cancelled: &mut cancelled,
            };
            (self.subscriptions[i].handler)(event, ctx, &mut emitter);

            for id in cancelled.drain(..) {
                if let Some(sub) = self.subscriptions.iter_mut().find(|s| s.id == id) {
                    sub.live = false;
                }
            }
        }
    }

    /// Drop every pending event undelivered.
    pub fn clear_pending(&mut self) {
        self.queue.clear();
    }

    pub fn clear_subscriptions(&mut self) {
        self.subscriptions.clear();
    }

    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.iter().filter(|s| s.live).count()
    }
}

impl<C> Default for EventBus<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{EntityId, Side};

    type Log = Vec<String>;

    fn describe(event: &Event) -> String {
        match event {
            Event::Sound { sound_id } => format!("sound:{sound_id}"),
            other => other.type_tag().to_string(),
        }
    }

    #[test]
    fn emit_does_not_deliver() {
        let mut bus: EventBus<Log> = EventBus::new();
        let mut log = Log::new();
        bus.subscribe("sound", |e, log: &mut Log, _| log.push(describe(e)));
        bus.emit(Event::sound("flap"));
        assert!(log.is_empty());
        assert_eq!(bus.pending_count(), 1);
    }

    #[test]
    fn delivers_matching_events_in_queue_order() {
        let mut bus: EventBus<Log> = EventBus::new();
        let mut log = Log::new();
        bus.subscribe("sound", |e, log: &mut Log, _| log.push(describe(e)));

        bus.emit(Event::sound("a"));
        bus.emit(Event::Border { entity: EntityId(1), side: Side::Left });
        bus.emit(Event::sound("b"));
        bus.process_events(&mut log);

        assert_eq!(log, vec!["sound:a", "sound:b"]);
        assert_eq!(bus.pending_count(), 0);
    }

    #[test]
    fn events_emitted_during_delivery_wait_for_next_pass() {
        let mut bus: EventBus<Log> = EventBus::new();
        let mut log = Log::new();
        bus.subscribe("sound", |e, log: &mut Log, out| {
            log.push(describe(e));
            out.emit(Event::sound("echo"));
        });

        bus.emit(Event::sound("a"));
        bus.emit(Event::game_over(false, ""));
        bus.emit(Event::sound("b"));
        bus.process_events(&mut log);
        assert_eq!(log, vec!["sound:a", "sound:b"]);
        assert_eq!(bus.pending_count(), 2);

        bus.process_events(&mut log);
        assert_eq!(log, vec!["sound:a", "sound:b", "sound:echo", "sound:echo"]);
    }

    #[test]
    fn subscribers_run_in_subscription_order() {
        let mut bus: EventBus<Log> = EventBus::new();
        let mut log = Log::new();
        bus.subscribe_all(|_, log: &mut Log, _| log.push("first".into()));
        bus.subscribe("sound", |_, log: &mut Log, _| log.push("second".into()));
        bus.subscribe("border", |_, log: &mut Log, _| log.push("never".into()));

        bus.emit(Event::sound("x"));
        bus.process_events(&mut log);
        assert_eq!(log, vec!["first", "second"]);
    }

    #[test]
    fn wildcard_receives_everything() {
        let mut bus: EventBus<Log> = EventBus::new();
        let mut log = Log::new();
        bus.subscribe(Event::WILDCARD, |e, log: &mut Log, _| log.push(describe(e)));
        bus.emit(Event::custom("level_up", 2));
        bus.emit(Event::sound("x"));
        bus.process_events(&mut log);
        assert_eq!(log, vec!["level_up", "sound:x"]);
    }

    #[test]
    fn unsubscribe_removes_and_is_idempotent() {
        let mut bus: EventBus<Log> = EventBus::new();
        let mut log = Log::new();
        let id = bus.subscribe("sound", |e, log: &mut Log, _| log.push(describe(e)));
        bus.unsubscribe(id);
        bus.unsubscribe(id);
        bus.emit(Event::sound("x"));
        bus.process_events(&mut log);
        assert!(log.is_empty());
        assert_eq!(bus.subscription_count(), 0);
    }

    #[test]
    fn cancelled_mid_delivery_gets_nothing_more() {
        let mut bus: EventBus<Log> = EventBus::new();
        let mut log = Log::new();
        // Subscription ids are handed out from 1 in order.
        let victim = SubscriptionId(2);
        bus.subscribe("sound", move |_, log: &mut Log, out| {
            log.push("killer".into());
            out.unsubscribe(victim);
        });
        let id = bus.subscribe("sound", |_, log: &mut Log, _| log.push("victim".into()));
        assert_eq!(id, victim);

        bus.emit(Event::sound("a"));
        bus.emit(Event::sound("b"));
        bus.process_events(&mut log);

        assert_eq!(log, vec!["killer", "killer"]);
        assert_eq!(bus.subscription_count(), 1);
    }

    #[test]
    fn handler_can_cancel_itself() {
        let mut bus: EventBus<Log> = EventBus::new();
        let mut log = Log::new();
        let me = SubscriptionId(1);
        bus.subscribe("sound", move |e, log: &mut Log, out| {
            log.push(describe(e));
            out.unsubscribe(me);
        });
        bus.emit(Event::sound("once"));
        bus.emit(Event::sound("twice"));
        bus.process_events(&mut log);
        assert_eq!(log, vec!["sound:once"]);
    }

    #[test]
    fn dispatch_immediate_bypasses_queue() {
        let mut bus: EventBus<Log> = EventBus::new();
        let mut log = Log::new();
        bus.subscribe("sound", |e, log: &mut Log, _| log.push(describe(e)));
        bus.emit(Event::sound("queued"));
        bus.dispatch_immediate(&Event::sound("now"), &mut log);
        assert_eq!(log, vec!["sound:now"]);
        assert_eq!(bus.pending_count(), 1);
    }

    #[test]
    fn clear_pending_drops_events() {
        let mut bus: EventBus<Log> = EventBus::new();
        let mut log = Log::new();
        bus.subscribe_all(|e, log: &mut Log, _| log.push(describe(e)));
        bus.emit(Event::sound("x"));
        bus.clear_pending();
        bus.process_events(&mut log);
        assert!(log.is_empty());
    }
}
