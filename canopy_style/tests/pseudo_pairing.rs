// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pseudo-class handler pairing.
//!
//! 1. A handler is subscribed exactly when some pseudo-class it serves has
//!    interest.
//! 2. Subscribe and unsubscribe calls alternate, starting with subscribe.
//! 3. After `release_all` every subscribe has been matched.

use canopy_property::{NodeClassId, PropertyRegistry};
use canopy_style::{
    IdSet, PseudoClassHandlers, PseudoClassHost, PseudoClassId, PseudoClassState,
};
use proptest::prelude::*;

const FOCUS: PseudoClassId = PseudoClassId(0);
const BLUR: PseudoClassId = PseudoClassId(1);
const ACTIVE: PseudoClassId = PseudoClassId(2);
const ALL: [PseudoClassId; 3] = [FOCUS, BLUR, ACTIVE];

struct Field {
    class: NodeClassId,
    pseudo: PseudoClassState,
    calls: Vec<bool>,
    listeners: usize,
}

impl PseudoClassHost for Field {
    fn node_class(&self) -> NodeClassId {
        self.class
    }

    fn pseudo_state(&self) -> &PseudoClassState {
        &self.pseudo
    }

    fn pseudo_state_mut(&mut self) -> &mut PseudoClassState {
        &mut self.pseudo
    }
}

fn toggle_listeners(field: &mut Field, subscribe: bool) {
    field.calls.push(subscribe);
    if subscribe {
        field.listeners += 2;
    } else {
        field.listeners -= 2;
    }
}

#[derive(Clone, Debug)]
enum Op {
    Add(usize),
    Remove(usize),
    Styled(Vec<usize>),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0_usize..3).prop_map(Op::Add),
        (0_usize..3).prop_map(Op::Remove),
        prop::collection::vec(0_usize..3, 0..3).prop_map(Op::Styled),
    ]
}

fn setup() -> (PropertyRegistry, PseudoClassHandlers<Field>, Field) {
    let mut registry = PropertyRegistry::new();
    let view = registry.register_class("View", None).unwrap();
    let field_class = registry.register_class("TextField", Some(view)).unwrap();
    let mut handlers = PseudoClassHandlers::new();
    handlers.register(view, "focus", [FOCUS, BLUR], toggle_listeners);
    let field = Field {
        class: field_class,
        pseudo: PseudoClassState::new(),
        calls: Vec::new(),
        listeners: 0,
    };
    (registry, handlers, field)
}

#[test]
fn subscribe_then_unsubscribe_leaves_no_listeners() {
    let (registry, handlers, mut field) = setup();
    handlers.add_interest(&mut field, FOCUS, &registry);
    assert_eq!(field.listeners, 2);
    handlers.remove_interest(&mut field, FOCUS, &registry);
    assert_eq!(field.listeners, 0);
    assert_eq!(field.calls, [true, false]);
}

proptest! {
    #[test]
    fn handler_calls_stay_paired(ops in prop::collection::vec(op(), 0..24)) {
        let (registry, handlers, mut field) = setup();

        for op in ops {
            match op {
                Op::Add(i) => handlers.add_interest(&mut field, ALL[i], &registry),
                Op::Remove(i) => handlers.remove_interest(&mut field, ALL[i], &registry),
                Op::Styled(ids) => {
                    let wanted = IdSet::from_ids(ids.into_iter().map(|i| ALL[i]));
                    handlers.set_interest(&mut field, &wanted, &registry);
                }
            }
            let interested = field.pseudo.interest(FOCUS) + field.pseudo.interest(BLUR) > 0;
            prop_assert_eq!(field.listeners > 0, interested);
            prop_assert!(field.listeners <= 2);
        }

        handlers.release_all(&mut field);
        prop_assert_eq!(field.listeners, 0);
        prop_assert!(field.pseudo.is_idle());
        for (i, subscribe) in field.calls.iter().enumerate() {
            prop_assert_eq!(*subscribe, i % 2 == 0);
        }
        prop_assert_eq!(field.calls.len() % 2, 0);
    }
}
