//! The execution engine: operation dispatch, resource guards, and the
//! SATURATE fixed-point loop.
//!
//! Control flow is threaded explicitly as a [`Flow`] variant: a false
//! GATE becomes `Flow::Break` and is consumed by the nearest enclosing
//! SATURATE, or by the phase when no SATURATE encloses it. Nothing
//! unwinds; resource violations are ordinary `Err` values.

use liminal_types::ast::{GateCond, Op, OpKind, Program};
use liminal_types::{ExitStatus, VmConfig, VmError};
use std::collections::BTreeMap;

use crate::result::Checkpoint;
use crate::snapshot::Snapshot;

/// Outcome of dispatching an operation or running a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    /// Keep going with the next operation.
    Continue,
    /// A GATE evaluated false: abandon the rest of the current block.
    Break,
    /// HALT fired; drain all the way out to the finalizer.
    Halted,
}

/// The executor. Owns the mutable machine state for one invocation.
///
/// Created empty, driven by [`Executor::execute`], then consumed by the
/// finalizer. The AST and configuration are only ever read.
pub struct Executor<'cfg> {
    pub(crate) config: &'cfg VmConfig,
    pub(crate) stack: Vec<String>,
    pub(crate) bindings: BTreeMap<String, String>,
    pub(crate) op_count: u64,
    pub(crate) phases_entered: u64,
    pub(crate) halted: bool,
    pub(crate) trace: Vec<Checkpoint>,
    pub(crate) current_phase: Option<String>,
}

impl<'cfg> Executor<'cfg> {
    pub fn new(config: &'cfg VmConfig) -> Self {
        Self {
            config,
            stack: Vec::new(),
            bindings: BTreeMap::new(),
            op_count: 0,
            phases_entered: 0,
            halted: false,
            trace: Vec::new(),
            current_phase: None,
        }
    }

    /// Execute every phase in source order.
    ///
    /// `Ok(())` covers both clean completion and HALT; the distinction is
    /// the sticky `halted` flag. `Err` carries a resource violation with
    /// phase context and the counter value at the failure point.
    pub fn execute(&mut self, program: &Program) -> Result<(), VmError> {
        for phase in &program.phases {
            if self.halted {
                break;
            }
            self.current_phase = Some(phase.name.clone());
            self.phases_entered += 1;
            match self.run_block(&phase.body)? {
                Flow::Halted => break,
                // A false GATE outside any SATURATE ends the phase cleanly.
                Flow::Break | Flow::Continue => {}
            }
        }
        Ok(())
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Block execution & guards
    // ══════════════════════════════════════════════════════════════════════════

    /// Run a linear operation sequence with the between-operation guards.
    ///
    /// Guard order: sticky halt first, then the operation budget, then
    /// dispatch. The counter is incremented after a dispatch completes,
    /// so an operation that trips a guard mid-flight is not counted, and
    /// HALT itself is never counted.
    fn run_block(&mut self, ops: &[Op]) -> Result<Flow, VmError> {
        for op in ops {
            if self.halted {
                return Ok(Flow::Halted);
            }
            if self.op_count >= self.config.max_ops {
                return Err(self.guard_err(
                    ExitStatus::TermOpLimit,
                    format!("operation budget exhausted (max_ops {})", self.config.max_ops),
                ));
            }
            match self.dispatch(op)? {
                Flow::Continue => self.op_count += 1,
                Flow::Break => {
                    self.op_count += 1;
                    return Ok(Flow::Break);
                }
                Flow::Halted => return Ok(Flow::Halted),
            }
        }
        Ok(Flow::Continue)
    }

    fn dispatch(&mut self, op: &Op) -> Result<Flow, VmError> {
        match &op.kind {
            OpKind::Push(sym) => {
                if self.stack.len() + 1 > self.config.max_stack {
                    return Err(self.guard_err(
                        ExitStatus::ErrStackOverflow,
                        format!("stack overflow (max_stack {})", self.config.max_stack),
                    ));
                }
                self.stack.push(sym.clone());
                Ok(Flow::Continue)
            }
            OpKind::Invert => {
                self.stack.reverse();
                Ok(Flow::Continue)
            }
            OpKind::Bind(key, value) => {
                if !self.bindings.contains_key(key)
                    && self.bindings.len() + 1 > self.config.max_bindings
                {
                    return Err(self.guard_err(
                        ExitStatus::ErrBindingsOverflow,
                        format!("bindings overflow (max_bindings {})", self.config.max_bindings),
                    ));
                }
                self.bindings.insert(key.clone(), value.clone());
                Ok(Flow::Continue)
            }
            OpKind::Release(key) => {
                self.bindings.remove(key);
                Ok(Flow::Continue)
            }
            OpKind::Gate(cond) => {
                if self.eval_condition(cond) {
                    Ok(Flow::Continue)
                } else {
                    Ok(Flow::Break)
                }
            }
            OpKind::Saturate(body) => self.run_saturate(body),
            OpKind::Witness => {
                if self.config.trace_enabled {
                    self.trace.push(Checkpoint {
                        phase_name: self.current_phase.clone().unwrap_or_default(),
                        // Counter value with this checkpoint itself counted.
                        op_count: self.op_count + 1,
                        stack: self.stack.clone(),
                        bindings: self.bindings.clone(),
                    });
                }
                Ok(Flow::Continue)
            }
            OpKind::Halt => {
                self.halted = true;
                Ok(Flow::Halted)
            }
        }
    }

    // ══════════════════════════════════════════════════════════════════════════
    // SATURATE
    // ══════════════════════════════════════════════════════════════════════════

    /// Repeat `body` until fixed point, GATE break, HALT, or the iteration
    /// budget.
    ///
    /// Each invocation gets a fresh iteration counter, so nested SATURATE
    /// loops account independently. Fixed point compares a pre/post deep
    /// snapshot of stack and bindings; a false GATE anywhere in the body
    /// is the canonical loop exit and terminates the SATURATE successfully.
    fn run_saturate(&mut self, body: &[Op]) -> Result<Flow, VmError> {
        let mut iterations: u64 = 0;
        loop {
            let pre = Snapshot::capture(&self.stack, &self.bindings);
            match self.run_block(body)? {
                Flow::Halted => return Ok(Flow::Halted),
                Flow::Break => return Ok(Flow::Continue),
                Flow::Continue => {}
            }
            let post = Snapshot::capture(&self.stack, &self.bindings);
            if pre == post {
                return Ok(Flow::Continue);
            }
            iterations += 1;
            if iterations >= self.config.max_saturate {
                return Err(self.guard_err(
                    ExitStatus::TermCycleLimit,
                    format!(
                        "SATURATE exceeded max_saturate ({}) iterations",
                        self.config.max_saturate
                    ),
                ));
            }
        }
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Conditions & errors
    // ══════════════════════════════════════════════════════════════════════════

    /// Evaluate a GATE condition. Side-effect free.
    fn eval_condition(&self, cond: &GateCond) -> bool {
        match cond {
            GateCond::DepthLt(n) => (self.stack.len() as u64) < *n,
            GateCond::DepthGt(n) => (self.stack.len() as u64) > *n,
            GateCond::DepthEq(n) => self.stack.len() as u64 == *n,
            GateCond::Bound(key) => self.bindings.contains_key(key),
            GateCond::Unbound(key) => !self.bindings.contains_key(key),
        }
    }

    /// A resource-guard error with phase context and the current counter.
    fn guard_err(&self, status: ExitStatus, message: String) -> VmError {
        let err = VmError::bare(status, message);
        match &self.current_phase {
            Some(phase) => err.in_phase(phase.clone(), self.op_count),
            None => err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liminal_types::Span;

    fn op(kind: OpKind) -> Op {
        Op::new(kind, Span::start())
    }

    fn program(body: Vec<Op>) -> Program {
        Program {
            phases: vec![liminal_types::ast::Phase {
                name: "TEST".into(),
                body,
                span: Span::start(),
            }],
        }
    }

    #[test]
    fn test_push_and_invert() {
        let config = VmConfig::default();
        let mut exec = Executor::new(&config);
        exec.execute(&program(vec![
            op(OpKind::Push("a".into())),
            op(OpKind::Push("b".into())),
            op(OpKind::Push("c".into())),
            op(OpKind::Invert),
        ]))
        .unwrap();
        assert_eq!(exec.stack, vec!["c", "b", "a"]);
        assert_eq!(exec.op_count, 4);
    }

    #[test]
    fn test_invert_on_empty_stack_is_noop() {
        let config = VmConfig::default();
        let mut exec = Executor::new(&config);
        exec.execute(&program(vec![op(OpKind::Invert)])).unwrap();
        assert!(exec.stack.is_empty());
        assert_eq!(exec.op_count, 1);
    }

    #[test]
    fn test_bind_overwrites_without_growth() {
        let config = VmConfig {
            max_bindings: 1,
            ..VmConfig::default()
        };
        let mut exec = Executor::new(&config);
        exec.execute(&program(vec![
            op(OpKind::Bind("k".into(), "v1".into())),
            op(OpKind::Bind("k".into(), "v2".into())),
        ]))
        .unwrap();
        assert_eq!(exec.bindings.get("k").map(String::as_str), Some("v2"));
    }

    #[test]
    fn test_bind_new_key_over_limit_errors() {
        let config = VmConfig {
            max_bindings: 1,
            ..VmConfig::default()
        };
        let mut exec = Executor::new(&config);
        let err = exec
            .execute(&program(vec![
                op(OpKind::Bind("a".into(), "1".into())),
                op(OpKind::Bind("b".into(), "2".into())),
            ]))
            .unwrap_err();
        assert_eq!(err.status, ExitStatus::ErrBindingsOverflow);
        // The failed BIND is not counted and did not mutate.
        assert_eq!(err.op_count, 1);
        assert_eq!(exec.bindings.len(), 1);
    }

    #[test]
    fn test_release_missing_key_is_noop() {
        let config = VmConfig::default();
        let mut exec = Executor::new(&config);
        exec.execute(&program(vec![op(OpKind::Release("ghost".into()))]))
            .unwrap();
        assert_eq!(exec.op_count, 1);
    }

    #[test]
    fn test_halt_is_not_counted() {
        let config = VmConfig::default();
        let mut exec = Executor::new(&config);
        exec.execute(&program(vec![
            op(OpKind::Push("x".into())),
            op(OpKind::Halt),
            op(OpKind::Push("unreachable".into())),
        ]))
        .unwrap();
        assert!(exec.halted);
        assert_eq!(exec.op_count, 1);
        assert_eq!(exec.stack, vec!["x"]);
    }

    #[test]
    fn test_gate_false_outside_saturate_ends_phase_only() {
        let config = VmConfig::default();
        let mut exec = Executor::new(&config);
        let prog = Program {
            phases: vec![
                liminal_types::ast::Phase {
                    name: "FIRST".into(),
                    body: vec![
                        op(OpKind::Gate(GateCond::DepthGt(0))),
                        op(OpKind::Push("skipped".into())),
                    ],
                    span: Span::start(),
                },
                liminal_types::ast::Phase {
                    name: "SECOND".into(),
                    body: vec![op(OpKind::Push("ran".into()))],
                    span: Span::start(),
                },
            ],
        };
        exec.execute(&prog).unwrap();
        assert_eq!(exec.stack, vec!["ran"]);
        assert_eq!(exec.phases_entered, 2);
    }

    #[test]
    fn test_saturate_fixed_point_in_one_iteration_for_noop_body() {
        let config = VmConfig::default();
        let mut exec = Executor::new(&config);
        // INVERT on an empty stack changes nothing: one pass, fixed point.
        exec.execute(&program(vec![op(OpKind::Saturate(vec![op(OpKind::Invert)]))]))
            .unwrap();
        // One INVERT plus the SATURATE itself.
        assert_eq!(exec.op_count, 2);
    }

    #[test]
    fn test_nested_saturate_counters_are_independent() {
        let config = VmConfig {
            max_saturate: 5,
            max_stack: 4_096,
            ..VmConfig::default()
        };
        let mut exec = Executor::new(&config);
        // The inner loop pushes until its GATE breaks at depth 3 without
        // tripping its own 5-iteration budget; the outer loop's GATE then
        // breaks on the first pass.
        let inner = op(OpKind::Saturate(vec![
            op(OpKind::Push("i".into())),
            op(OpKind::Gate(GateCond::DepthLt(3))),
        ]));
        let outer = op(OpKind::Saturate(vec![
            inner,
            op(OpKind::Gate(GateCond::DepthLt(3))),
        ]));
        exec.execute(&program(vec![outer])).unwrap();
        // Inner saturates to depth 3, then the outer GATE (depth < 3 is
        // false at 3) terminates the outer loop on its first pass.
        assert_eq!(exec.stack.len(), 3);
    }

    #[test]
    fn test_witness_counts_even_when_trace_disabled() {
        let config = VmConfig::default();
        let mut exec = Executor::new(&config);
        exec.execute(&program(vec![op(OpKind::Witness), op(OpKind::Witness)]))
            .unwrap();
        assert!(exec.trace.is_empty());
        assert_eq!(exec.op_count, 2);
    }

    #[test]
    fn test_witness_checkpoint_contents() {
        let config = VmConfig {
            trace_enabled: true,
            ..VmConfig::default()
        };
        let mut exec = Executor::new(&config);
        exec.execute(&program(vec![
            op(OpKind::Push("a".into())),
            op(OpKind::Witness),
        ]))
        .unwrap();
        assert_eq!(exec.trace.len(), 1);
        let cp = &exec.trace[0];
        assert_eq!(cp.phase_name, "TEST");
        assert_eq!(cp.op_count, 2);
        assert_eq!(cp.stack, vec!["a"]);
        assert!(cp.bindings.is_empty());
    }

    #[test]
    fn test_op_limit_guard_fires_between_operations() {
        let config = VmConfig {
            max_ops: 3,
            ..VmConfig::default()
        };
        let mut exec = Executor::new(&config);
        let err = exec
            .execute(&program(vec![
                op(OpKind::Push("1".into())),
                op(OpKind::Push("2".into())),
                op(OpKind::Push("3".into())),
                op(OpKind::Push("4".into())),
            ]))
            .unwrap_err();
        assert_eq!(err.status, ExitStatus::TermOpLimit);
        assert_eq!(err.op_count, 3);
        assert_eq!(exec.stack.len(), 3);
    }
}
