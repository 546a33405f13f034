use goap_state::{State, StateError};

fn state_of(rules: &[&str]) -> State {
    State::of(rules.iter().copied()).expect("rules")
}

#[test]
fn matches_subset() {
    let full = state_of(&["A", "B", "C"]);
    let part = state_of(&["A", "B"]);

    assert_eq!(full.matches(&part), Ok(true));
    assert_eq!(part.matches(&full), Ok(false));
}

#[test]
fn matches_numeric_comparisons_strictly() {
    let state = state_of(&["A=50", "B=100"]);

    assert_eq!(state.matches(&state_of(&["A>10", "B=100"])), Ok(true));
    assert_eq!(state.matches(&state_of(&["A>50"])), Ok(false));
    assert_eq!(state.matches(&state_of(&["A<50"])), Ok(false));
    assert_eq!(state.matches(&state_of(&["A<51"])), Ok(true));
}

#[test]
fn missing_facts_resolve_to_zero() {
    let empty = state_of(&[]);

    assert_eq!(empty.matches(&state_of(&["!food"])), Ok(true));
    assert_eq!(empty.matches(&state_of(&["food>0"])), Ok(false));
    assert_eq!(empty.matches(&state_of(&["food<1"])), Ok(true));
}

#[test]
fn matching_against_unresolved_state_fails() {
    let unresolved = state_of(&["A>10"]);
    let pattern = state_of(&["A=50"]);

    assert!(matches!(
        unresolved.matches(&pattern),
        Err(StateError::Unresolved { .. })
    ));
}

#[test]
fn arithmetic_pattern_operators_are_rejected() {
    let state = state_of(&["A"]);
    let pattern = state_of(&["A+5"]);

    assert!(matches!(
        state.matches(&pattern),
        Err(StateError::InvalidPattern { .. })
    ));
}

#[test]
fn hash_is_order_independent() {
    let forward = state_of(&["A", "B", "C"]);
    let backward = state_of(&["C", "B", "A"]);
    let wider = state_of(&["A", "B", "C", "D"]);

    assert_eq!(forward.hash(), backward.hash());
    assert_ne!(forward.hash(), wider.hash());
    assert_ne!(backward.hash(), wider.hash());
}

#[test]
fn hash_is_value_sensitive() {
    let zeroed = state_of(&["food=0", "hunger=0", "tired=0"]);
    let partial = state_of(&["food=10", "hunger=0", "tired=10"]);

    assert_ne!(zeroed.hash(), partial.hash());
}

#[test]
fn equals_compares_contents() {
    let a = state_of(&["A", "B", "C"]);
    let b = state_of(&["A", "B", "C"]);
    let wider = state_of(&["A", "B", "C", "D"]);
    let narrower = state_of(&["A", "B"]);
    let other = state_of(&["A", "D"]);

    assert!(a.equals(&b));
    assert!(b.equals(&a));
    assert!(!a.equals(&wider));
    assert!(!wider.equals(&a));
    assert!(!a.equals(&narrower));
    assert!(!narrower.equals(&other));
}

#[test]
fn clones_are_isolated() {
    let mut state = state_of(&["A", "B", "C"]);
    let clone = state.clone();
    assert!(clone.equals(&state));

    state.del("A").expect("del");
    assert!(!clone.equals(&state));
    assert_eq!(clone.len(), 3);
    assert_eq!(clone.to_string(), "{A=100.00, B=100.00, C=100.00}");
}

#[test]
fn add_overwrites_existing_facts() {
    let mut state = state_of(&["A"]);
    state.add("A=50").expect("add");

    assert_eq!(state.len(), 1);
    assert!(state.equals(&state_of(&["A=50"])));
}

#[test]
fn apply_merges_assignments() {
    let mut state = state_of(&["A", "B", "C"]);
    state.apply(&state_of(&["D", "E"])).expect("apply");

    assert_eq!(state.matches(&state_of(&["A", "B", "C", "D", "E"])), Ok(true));
}

#[test]
fn apply_assignment_effects_hold_afterwards() {
    let mut state = state_of(&["A=10"]);
    let effects = state_of(&["A=70", "B=30"]);
    state.apply(&effects).expect("apply");

    assert_eq!(state.matches(&state_of(&["A=70"])), Ok(true));
    assert_eq!(state.matches(&state_of(&["B=30"])), Ok(true));
}

#[test]
fn apply_arithmetic_saturates() {
    let mut state = state_of(&["hunger=80", "fuel=95"]);

    state.apply(&state_of(&["hunger-50"])).expect("apply");
    assert_eq!(state.matches(&state_of(&["hunger=30"])), Ok(true));

    state.apply(&state_of(&["hunger-50"])).expect("apply");
    assert_eq!(state.matches(&state_of(&["hunger=0"])), Ok(true));

    state.apply(&state_of(&["fuel+10"])).expect("apply");
    assert_eq!(state.matches(&state_of(&["fuel=100"])), Ok(true));

    // Absent facts start from zero.
    state.apply(&state_of(&["food+10"])).expect("apply");
    assert_eq!(state.matches(&state_of(&["food=10"])), Ok(true));
}

#[test]
fn apply_rejects_comparator_effects() {
    let mut state = state_of(&["A"]);

    assert!(matches!(
        state.apply(&state_of(&["A>5"])),
        Err(StateError::InvalidEffect { .. })
    ));
}

#[test]
fn apply_onto_unresolved_state_fails() {
    let mut unresolved = state_of(&["A>10"]);

    assert!(matches!(
        unresolved.apply(&state_of(&["A+5"])),
        Err(StateError::UnresolvedTarget { .. })
    ));
}

#[test]
fn distance_boundaries() {
    assert_eq!(state_of(&["A"]).distance(&state_of(&["A"])), 0.0);
    assert_eq!(state_of(&["A=100"]).distance(&state_of(&["A=10"])), 90.0);
    assert_eq!(state_of(&["A"]).distance(&state_of(&["B"])), 200.0);
}

#[test]
fn distance_counts_differential_facts_in_both_directions() {
    let state = state_of(&["A", "B", "C"]);
    let goal = state_of(&["A", "B", "C", "D", "E"]);

    assert_eq!(state.distance(&goal), 200.0);
    assert_eq!(goal.distance(&state), 200.0);
    assert_eq!(
        state_of(&["A=50", "B"]).distance(&state_of(&["A=70", "C"])),
        220.0
    );
}

#[test]
fn mutual_match_implies_equal_hashes() {
    let a = state_of(&["A=50", "B"]);
    let b = state_of(&["B=100", "A=50"]);

    assert_eq!(a.matches(&b), Ok(true));
    assert_eq!(b.matches(&a), Ok(true));
    assert_eq!(a.hash(), b.hash());
}

#[test]
fn displays_sorted_canonical_rules() {
    let state = state_of(&["C", "A", "B=12.5"]);
    assert_eq!(state.to_string(), "{A=100.00, B=12.50, C=100.00}");

    assert_eq!(state_of(&[]).to_string(), "{}");
}

#[test]
fn del_removes_facts_beyond_the_linear_scan_window() {
    let mut state = state_of(&["A", "B", "C", "D", "E", "F", "G", "H", "I"]);

    state.del("E").expect("del");
    state.del("F").expect("del");
    assert_eq!(
        state.to_string(),
        "{A=100.00, B=100.00, C=100.00, D=100.00, G=100.00, H=100.00, I=100.00}"
    );

    // Deleting an absent fact is a no-op.
    let hash = state.hash();
    state.del("E").expect("del");
    assert_eq!(state.hash(), hash);

    assert!(state.del("E>=1").is_err());
}
