#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeStatus {
    Active,
    /// Failed by capacity dynamics; may recover on its own.
    Failed,
    /// Failed by an operator command; only an explicit enable restores it.
    Disabled,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeState {
    capacity: f64,
    flow: f64,
    status: EdgeStatus,
}

impl EdgeState {
    pub fn new(capacity: f64) -> Self {
        Self {
            capacity,
            flow: 0.0,
            status: EdgeStatus::Active,
        }
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn flow(&self) -> f64 {
        self.flow
    }

    pub fn status(&self) -> EdgeStatus {
        self.status
    }

    pub fn is_failed(&self) -> bool {
        self.status != EdgeStatus::Active
    }

    pub fn residual(&self) -> f64 {
        (self.capacity - self.flow).max(0.0)
    }

    pub fn utilization(&self) -> f64 {
        if self.capacity > 0.0 {
            self.flow / self.capacity
        } else if self.flow > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    }

    pub(crate) fn set_capacity(&mut self, capacity: f64) {
        self.capacity = capacity;
    }

    pub(crate) fn set_flow(&mut self, flow: f64) {
        self.flow = flow;
    }

    pub(crate) fn fail(&mut self, status: EdgeStatus) {
        self.capacity = 0.0;
        self.status = status;
    }

    pub(crate) fn restore(&mut self, base_capacity: f64) {
        self.capacity = base_capacity;
        self.status = EdgeStatus::Active;
    }
}
