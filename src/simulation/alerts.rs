use crate::graph::edge::EdgeId;
use crate::graph::graph::Graph;
use crate::state::event::NetworkEvent;
use tracing::debug;

/// Declaration order is surfacing priority: failures first, recoveries last.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AlertKind {
    Failure,
    Overload,
    Recovery,
}

impl AlertKind {
    pub fn label(&self) -> &'static str {
        match self {
            AlertKind::Failure => "failure",
            AlertKind::Overload => "overload",
            AlertKind::Recovery => "recovery",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Alert {
    pub kind: AlertKind,
    pub edge: EdgeId,
    pub magnitude: f64,
    /// tick the event happened on; a command issued between ticks carries
    /// the tick before it
    pub tick: usize,
}

impl Alert {
    fn from_event(event: &NetworkEvent, tick: usize) -> Self {
        let (kind, magnitude) = match event {
            NetworkEvent::Failure { capacity_lost, .. } => (AlertKind::Failure, *capacity_lost),
            NetworkEvent::Overload { excess, .. } => (AlertKind::Overload, *excess),
            NetworkEvent::Recovery { capacity, .. } => (AlertKind::Recovery, *capacity),
        };
        Self {
            kind,
            edge: event.edge(),
            magnitude,
            tick,
        }
    }

    pub fn describe(&self, graph: &Graph) -> String {
        format!(
            "[t{}] {} on {} ({:.2})",
            self.tick,
            self.kind.label(),
            graph.edge_by_id(self.edge).name(),
            self.magnitude
        )
    }
}

/// Filters a tick's events down to at most `budget` alerts. Controllers only
/// ever observe this subset, never the full event list.
pub struct AlertSystem {
    budget: usize,
    suppressed: usize,
}

impl AlertSystem {
    pub fn new(budget: usize) -> Self {
        Self {
            budget,
            suppressed: 0,
        }
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn suppressed(&self) -> usize {
        self.suppressed
    }

    /// Orders by kind priority, then by lowest edge id (definition order),
    /// then by arrival, and keeps the first `budget`.
    pub fn sample(&mut self, events: &[(usize, NetworkEvent)]) -> Vec<Alert> {
        let mut alerts = events
            .iter()
            .map(|(tick, e)| Alert::from_event(e, *tick))
            .collect::<Vec<Alert>>();
        alerts.sort_by_key(|a| (a.kind, a.edge));

        if alerts.len() > self.budget {
            let withheld = alerts.len() - self.budget;
            self.suppressed += withheld;
            debug!(withheld, budget = self.budget, "alerts suppressed");
            alerts.truncate(self.budget);
        }
        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(edge: usize) -> (usize, NetworkEvent) {
        (
            12,
            NetworkEvent::Failure {
                edge: EdgeId(edge),
                capacity_lost: 5.0,
            },
        )
    }

    fn overload(edge: usize) -> (usize, NetworkEvent) {
        (
            12,
            NetworkEvent::Overload {
                edge: EdgeId(edge),
                excess: 1.5,
            },
        )
    }

    fn recovery(edge: usize) -> (usize, NetworkEvent) {
        (
            12,
            NetworkEvent::Recovery {
                edge: EdgeId(edge),
                capacity: 8.0,
            },
        )
    }

    #[test]
    fn test_budget_caps_feed_by_priority() {
        let mut system = AlertSystem::new(3);
        let events = vec![recovery(0), overload(4), failure(7), overload(2), failure(3)];

        let alerts = system.sample(&events);
        let picked = alerts
            .iter()
            .map(|a| (a.kind, a.edge.index()))
            .collect::<Vec<_>>();
        assert_eq!(
            vec![
                (AlertKind::Failure, 3),
                (AlertKind::Failure, 7),
                (AlertKind::Overload, 2)
            ],
            picked
        );
        assert!(alerts.iter().all(|a| a.tick == 12));
        assert_eq!(2, system.suppressed());
    }

    #[test]
    fn test_feed_under_budget_is_complete() {
        let mut system = AlertSystem::new(5);
        let alerts = system.sample(&[recovery(1), failure(2)]);

        assert_eq!(2, alerts.len());
        assert_eq!(AlertKind::Failure, alerts[0].kind);
        assert_eq!(AlertKind::Recovery, alerts[1].kind);
        assert_eq!(0, system.suppressed());
    }

    #[test]
    fn test_zero_budget_surfaces_nothing() {
        let mut system = AlertSystem::new(0);
        assert!(system.sample(&[failure(0)]).is_empty());
        assert_eq!(1, system.suppressed());
    }

    #[test]
    fn test_alert_keeps_tick_of_event() {
        let mut system = AlertSystem::new(5);
        let alerts = system.sample(&[(3, failure(1).1), recovery(2)]);

        assert_eq!(
            vec![(AlertKind::Failure, 3), (AlertKind::Recovery, 12)],
            alerts.iter().map(|a| (a.kind, a.tick)).collect::<Vec<_>>()
        );
    }
}
