//! Serialises route and flow solves through a FIFO queue: any number of
//! agents may ask at once but at most one search runs per tick, bounding
//! the pathfinding cost a frame can accrue. Completions are announced as
//! events in the order the requests were admitted
//!

use crate::prelude::*;
use bevy::prelude::*;
use std::collections::VecDeque;

/// Identifies a request for the lifetime of its trip through a queue
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Reflect)]
pub struct PathRequestId(u64);

impl PathRequestId {
	/// Create a new instance of [PathRequestId]
	pub fn new(id: u64) -> Self {
		PathRequestId(id)
	}
	/// Get the raw identifier
	pub fn get(&self) -> u64 {
		self.0
	}
}

/// The work a queued request is asking for
#[derive(Debug, Clone, PartialEq)]
pub enum RequestKind {
	/// Solve a single route between two world positions
	Route {
		/// Where the route begins
		start: Vec2,
		/// Where the route should end
		goal: Vec2,
		/// What to do when the goal cannot be reached
		fallback: GoalFallback,
	},
	/// Solve the shared direction field for a set of weighted targets
	Flow {
		/// The targets agents should converge on
		targets: Vec<FlowTarget>,
	},
}

/// A request sitting in the backlog waiting its turn
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedRequest {
	/// Identifies the request to completions and cancellations
	id: PathRequestId,
	/// The agent the answer is for, if any
	agent: Option<Entity>,
	/// The work being asked for
	kind: RequestKind,
}

impl QueuedRequest {
	/// Get the identifier of the request
	pub fn get_id(&self) -> PathRequestId {
		self.id
	}
	/// Get the agent the answer is for
	pub fn get_agent(&self) -> Option<Entity> {
		self.agent
	}
	/// Get the work being asked for
	pub fn get_kind(&self) -> &RequestKind {
		&self.kind
	}
}

/// The answer a processed request produced
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
	/// The answer to a [RequestKind::Route]
	Route(PathOutcome),
	/// The answer to a [RequestKind::Flow], the field itself lives on the
	/// grid for any agent to read
	Flow(FlowSummary),
}

impl RequestOutcome {
	/// The route result carried by this outcome, if it was a route request
	pub fn route(&self) -> Option<&PathOutcome> {
		match self {
			RequestOutcome::Route(outcome) => Some(outcome),
			RequestOutcome::Flow(_) => None,
		}
	}
	/// The flow result carried by this outcome, if it was a flow request
	pub fn flow(&self) -> Option<&FlowSummary> {
		match self {
			RequestOutcome::Route(_) => None,
			RequestOutcome::Flow(summary) => Some(summary),
		}
	}
}

/// A request that has been taken off the queue and solved
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedRequest {
	/// Identifies the request that was solved
	id: PathRequestId,
	/// The agent the answer is for, if any
	agent: Option<Entity>,
	/// The answer produced
	outcome: RequestOutcome,
}

impl CompletedRequest {
	/// Get the identifier of the request that was solved
	pub fn get_id(&self) -> PathRequestId {
		self.id
	}
	/// Get the agent the answer is for
	pub fn get_agent(&self) -> Option<Entity> {
		self.agent
	}
	/// Get the answer produced
	pub fn get_outcome(&self) -> &RequestOutcome {
		&self.outcome
	}
}

/// FIFO admission control in front of the solvers. Requests are processed
/// strictly in arrival order and only the head of the backlog is solved per
/// call, deliberately rationing how much pathfinding one tick can buy
#[derive(Component, Default)]
pub struct PathRequestQueue {
	/// Requests waiting to be solved, oldest first
	backlog: VecDeque<QueuedRequest>,
	/// Source of the next [PathRequestId]
	next_id: u64,
}

impl PathRequestQueue {
	/// Create an empty queue
	pub fn new() -> Self {
		PathRequestQueue::default()
	}
	/// Number of requests waiting to be solved
	pub fn backlog_len(&self) -> usize {
		self.backlog.len()
	}
	/// Whether no requests are waiting
	pub fn is_empty(&self) -> bool {
		self.backlog.is_empty()
	}
	/// Append a request to the backlog and hand back the identifier a
	/// completion or cancellation can be matched on
	pub fn enqueue(&mut self, kind: RequestKind, agent: Option<Entity>) -> PathRequestId {
		let id = PathRequestId::new(self.next_id);
		self.next_id += 1;
		trace!("Queued request {:?}", id);
		self.backlog.push_back(QueuedRequest { id, agent, kind });
		id
	}
	/// Drop a request that is still backlogged. Returns whether anything was
	/// removed: a request already taken for processing can no longer be
	/// cancelled and yields `false`
	pub fn cancel(&mut self, id: PathRequestId) -> bool {
		match self.backlog.iter().position(|request| request.id == id) {
			Some(index) => {
				self.backlog.remove(index);
				debug!("Cancelled request {:?}", id);
				true
			}
			None => {
				debug!("Request {:?} is not backlogged, nothing to cancel", id);
				false
			}
		}
	}
	/// Take the head of the backlog, solve it against `grid` and hand back
	/// the completed request, or [None] when the backlog is empty. One call
	/// solves exactly one request
	pub fn process_next(&mut self, grid: &mut NavGrid) -> Option<CompletedRequest> {
		let request = self.backlog.pop_front()?;
		debug!("Processing request {:?}", request.id);
		let outcome = match &request.kind {
			RequestKind::Route {
				start,
				goal,
				fallback,
			} => RequestOutcome::Route(find_route(grid, *start, *goal, *fallback)),
			RequestKind::Flow { targets } => RequestOutcome::Flow(solve_flow(grid, targets)),
		};
		Some(CompletedRequest {
			id: request.id,
			agent: request.agent,
			outcome,
		})
	}
}

/// Ask every queue for a route between two world positions
#[derive(Event)]
pub struct EventPathRequest {
	/// Where the route begins
	start: Vec2,
	/// Where the route should end
	goal: Vec2,
	/// What to do when the goal cannot be reached
	fallback: GoalFallback,
	/// The agent the answer is for, if any
	agent: Option<Entity>,
}

impl EventPathRequest {
	/// Create a new instance of [EventPathRequest]
	#[cfg(not(tarpaulin_include))]
	pub fn new(start: Vec2, goal: Vec2, fallback: GoalFallback, agent: Option<Entity>) -> Self {
		EventPathRequest {
			start,
			goal,
			fallback,
			agent,
		}
	}
	/// Get where the route begins
	#[cfg(not(tarpaulin_include))]
	pub fn get_start(&self) -> Vec2 {
		self.start
	}
	/// Get where the route should end
	#[cfg(not(tarpaulin_include))]
	pub fn get_goal(&self) -> Vec2 {
		self.goal
	}
	/// Get what to do when the goal cannot be reached
	#[cfg(not(tarpaulin_include))]
	pub fn get_fallback(&self) -> GoalFallback {
		self.fallback
	}
	/// Get the agent the answer is for
	#[cfg(not(tarpaulin_include))]
	pub fn get_agent(&self) -> Option<Entity> {
		self.agent
	}
}

/// Ask every queue for the shared direction field to be resolved for a set
/// of weighted targets
#[derive(Event)]
pub struct EventFlowFieldRequest {
	/// The targets agents should converge on
	targets: Vec<FlowTarget>,
	/// The agent the answer is for, if any
	agent: Option<Entity>,
}

impl EventFlowFieldRequest {
	/// Create a new instance of [EventFlowFieldRequest]
	#[cfg(not(tarpaulin_include))]
	pub fn new(targets: Vec<FlowTarget>, agent: Option<Entity>) -> Self {
		EventFlowFieldRequest { targets, agent }
	}
	/// Get the targets agents should converge on
	#[cfg(not(tarpaulin_include))]
	pub fn get_targets(&self) -> &[FlowTarget] {
		&self.targets
	}
	/// Get the agent the answer is for
	#[cfg(not(tarpaulin_include))]
	pub fn get_agent(&self) -> Option<Entity> {
		self.agent
	}
}

/// Ask every queue to drop a backlogged request before it is solved
#[derive(Event)]
pub struct EventCancelRequest(PathRequestId);

impl EventCancelRequest {
	/// Create a new instance of [EventCancelRequest]
	#[cfg(not(tarpaulin_include))]
	pub fn new(id: PathRequestId) -> Self {
		EventCancelRequest(id)
	}
	/// Get the identifier of the request to drop
	#[cfg(not(tarpaulin_include))]
	pub fn get(&self) -> PathRequestId {
		self.0
	}
}

/// Announces the answer to a processed request, written in the order the
/// requests were admitted
#[derive(Event)]
pub struct EventRequestComplete(CompletedRequest);

impl EventRequestComplete {
	/// Create a new instance of [EventRequestComplete]
	#[cfg(not(tarpaulin_include))]
	pub fn new(completed: CompletedRequest) -> Self {
		EventRequestComplete(completed)
	}
	/// Get the completed request being announced
	#[cfg(not(tarpaulin_include))]
	pub fn get(&self) -> &CompletedRequest {
		&self.0
	}
}

/// Feed admissions and cancellations sent as events into every
/// [PathRequestQueue]
#[cfg(not(tarpaulin_include))]
pub fn queue_requests(
	mut route_events: EventReader<EventPathRequest>,
	mut flow_events: EventReader<EventFlowFieldRequest>,
	mut cancel_events: EventReader<EventCancelRequest>,
	mut queues: Query<&mut PathRequestQueue>,
) {
	for event in route_events.read() {
		for mut queue in queues.iter_mut() {
			queue.enqueue(
				RequestKind::Route {
					start: event.get_start(),
					goal: event.get_goal(),
					fallback: event.get_fallback(),
				},
				event.get_agent(),
			);
		}
	}
	for event in flow_events.read() {
		for mut queue in queues.iter_mut() {
			queue.enqueue(
				RequestKind::Flow {
					targets: event.get_targets().to_vec(),
				},
				event.get_agent(),
			);
		}
	}
	for event in cancel_events.read() {
		for mut queue in queues.iter_mut() {
			queue.cancel(event.get());
		}
	}
}

/// Solve the head of every request queue and announce the answer. At most
/// one request is solved per queue per tick
#[cfg(not(tarpaulin_include))]
pub fn process_request_queue(
	mut query: Query<(&mut NavGrid, &mut PathRequestQueue)>,
	mut completions: EventWriter<EventRequestComplete>,
) {
	for (mut grid, mut queue) in query.iter_mut() {
		if let Some(completed) = queue.process_next(&mut grid) {
			completions.write(EventRequestComplete::new(completed));
		}
	}
}
