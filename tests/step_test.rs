//! Execution order, state threading and failure propagation of step trees.

use rstest::rstest;

use steptree::demo::{record, trace, Scenario, COUNTER_KEY};
use steptree::domain::{
    async_action, ensure, sync_action, ActionResult, AssertionFailed, Phase, State, Step,
};
use steptree::util::testing;

/// Give `step` a name plus enter and leave actions that record themselves.
fn traced<'a>(parent: &'a mut Step, name: &str) -> &'a mut Step {
    let enter_name = format!("enter {name}");
    let leave_name = format!("leave {name}");
    let step = parent
        .attach(sync_action(move |s: &mut State| record(s, &enter_name)))
        .with_name(name);
    step.set_cleanup(sync_action(move |s: &mut State| record(s, &leave_name)));
    step
}

// root
// ├── a
// │   ├── a1
// │   │   └── a1x
// │   └── a2
// └── b
//     └── b1
fn sample_tree() -> Step {
    let mut root = Step::new();
    {
        let a = traced(&mut root, "a");
        let a1 = traced(a, "a1");
        traced(a1, "a1x");
        traced(a, "a2");
    }
    {
        let b = traced(&mut root, "b");
        traced(b, "b1");
    }
    root
}

#[tokio::test]
async fn given_nested_tree_when_executed_then_enter_pre_order_and_leave_post_order() {
    testing::init_test_setup();
    let tree = sample_tree();

    let state = tree.execute().await.unwrap();

    assert_eq!(
        trace(&state),
        [
            "enter a", "enter a1", "enter a1x", "leave a1x", "leave a1", "enter a2", "leave a2",
            "leave a", "enter b", "enter b1", "leave b1", "leave b",
        ]
    );
}

#[tokio::test]
async fn given_nested_tree_when_executed_then_trace_matches_schedule() {
    let tree = sample_tree();

    let state = tree.execute().await.unwrap();

    let planned: Vec<String> = tree.schedule().iter().map(Phase::to_string).collect();
    assert_eq!(trace(&state), planned.as_slice());
}

#[tokio::test]
async fn given_tree_when_executed_twice_then_runs_are_independent() {
    let tree = sample_tree();

    let first = tree.execute().await.unwrap();
    let second = tree.execute().await.unwrap();

    assert_eq!(trace(&first).len(), 12);
    assert_eq!(trace(&first), trace(&second));
}

#[tokio::test]
async fn given_empty_tree_when_executed_then_noop_with_empty_state() {
    let tree: Step = Step::new();
    let state = tree.execute().await.unwrap();
    assert!(state.is_empty());
}

#[tokio::test]
async fn given_groups_without_actions_when_executed_then_children_still_run() {
    let mut root = Step::new();
    let group = root.attach_empty().attach_empty();
    traced(group, "leaf");

    let state = root.execute().await.unwrap();

    assert_eq!(trace(&state), ["enter leaf", "leave leaf"]);
}

#[tokio::test]
async fn given_caller_state_when_execute_with_then_actions_see_same_instance() {
    let mut root = Step::new();
    root.attach(sync_action(|s: &mut State| -> ActionResult {
        ensure(s.get::<&str>("seed") == Some(&"from caller"), "seed visible")?;
        s.insert("written", 7_u32);
        Ok(())
    }));
    root.attach(sync_action(|s: &mut State| {
        ensure(s.get::<u32>("written") == Some(&7), "earlier write visible")
    }));
    root.set_cleanup(sync_action(|s: &mut State| s.insert("cleaned", true)));

    let mut state = State::new();
    state.insert("seed", "from caller");
    root.execute_with(&mut state).await.unwrap();

    assert_eq!(state.get::<u32>("written"), Some(&7));
    assert_eq!(state.get::<bool>("cleaned"), Some(&true));
}

#[tokio::test]
async fn given_mixed_sync_and_async_actions_when_executed_then_order_is_identical() {
    let mut root = Step::new();
    let outer = root
        .attach(async_action(|s: &mut State| {
            Box::pin(async move {
                tokio::task::yield_now().await;
                record(s, "enter outer");
                Ok(())
            })
        }))
        .with_name("outer");
    outer.set_cleanup(sync_action(|s: &mut State| record(s, "leave outer")));
    outer
        .attach(sync_action(|s: &mut State| record(s, "enter inner")))
        .set_cleanup(async_action(|s: &mut State| {
            Box::pin(async move {
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                record(s, "leave inner");
                Ok(())
            })
        }));

    let state = root.execute().await.unwrap();

    assert_eq!(
        trace(&state),
        ["enter outer", "enter inner", "leave inner", "leave outer"]
    );
}

#[tokio::test]
async fn given_replaced_cleanup_when_executed_then_only_last_one_runs() {
    let mut root = Step::new();
    root.set_cleanup(sync_action(|s: &mut State| record(s, "first cleanup")));
    root.set_cleanup(sync_action(|s: &mut State| record(s, "second cleanup")));

    let state = root.execute().await.unwrap();

    assert_eq!(trace(&state), ["second cleanup"]);
}

// Root sets c=1, child bumps to 2 and restores 1, root cleanup checks c.
#[tokio::test]
async fn given_scenario_a_when_executed_then_passes_with_counter_one() {
    let state = Scenario::Pass.build().execute().await.unwrap();

    assert_eq!(state.get::<i32>(COUNTER_KEY), Some(&1));
    assert_eq!(
        trace(&state),
        ["enter outer", "enter inner", "leave inner", "leave outer"]
    );
}

#[tokio::test]
async fn given_scenario_b_when_executed_then_root_cleanup_assertion_surfaces_unchanged() {
    let tree = Scenario::Fail.build();
    let mut state = State::new();

    let err = tree.execute_with(&mut state).await.unwrap_err();

    let failed = err
        .downcast_ref::<AssertionFailed>()
        .expect("original AssertionFailed");
    assert_eq!(failed.message, "expected c == 0, got 1");
    assert_eq!(trace(&state).last().map(String::as_str), Some("leave outer"));
}

#[tokio::test]
#[should_panic(expected = "assertion `left == right` failed")]
async fn given_panicking_cleanup_when_executed_then_panic_propagates() {
    let mut root = Step::new();
    root.attach(sync_action(|s: &mut State| s.insert("c", 1_i32)));
    root.set_cleanup(sync_action(|s: &mut State| {
        assert_eq!(s.get::<i32>("c"), Some(&0));
    }));

    let _ = root.execute().await;
}

// The failing child's cleanup, its later siblings and the parent's cleanup
// are all skipped: each sits after the failed `?` in its own execute body.
#[tokio::test]
async fn given_failing_child_enter_when_executed_then_rest_of_run_is_skipped() {
    let tree = Scenario::Abort.build();
    let mut state = State::new();

    let err = tree.execute_with(&mut state).await.unwrap_err();

    let io = err.downcast_ref::<std::io::Error>().expect("original io::Error");
    assert_eq!(io.to_string(), "fixture unavailable");
    assert_eq!(
        trace(&state),
        ["enter parent", "enter first", "leave first", "enter broken"]
    );
}

#[tokio::test]
async fn given_failing_leave_when_executed_then_later_siblings_do_not_run() {
    let mut root = Step::new();
    {
        let first = traced(&mut root, "first");
        first.set_cleanup(sync_action(|s: &mut State| {
            record(s, "leave first");
            ensure(false, "cleanup broke")
        }));
    }
    traced(&mut root, "second");
    root.set_cleanup(sync_action(|s: &mut State| record(s, "leave root")));

    let mut state = State::new();
    let err = root.execute_with(&mut state).await.unwrap_err();

    assert_eq!(err.to_string(), "assertion failed: cleanup broke");
    assert_eq!(trace(&state), ["enter first", "leave first"]);
}

#[rstest]
#[case(Scenario::Counter, true)]
#[case(Scenario::Pass, true)]
#[case(Scenario::Fail, false)]
#[case(Scenario::Abort, false)]
#[tokio::test]
async fn given_demo_scenario_when_executed_then_outcome_matches(
    #[case] scenario: Scenario,
    #[case] passes: bool,
) {
    let result = scenario.build().execute().await;
    assert_eq!(result.is_ok(), passes, "{scenario}");
}

#[tokio::test]
async fn given_counter_scenario_when_executed_then_links_nest_correctly() {
    let state = Scenario::Counter.build().execute().await.unwrap();

    assert_eq!(
        trace(&state),
        [
            "enter first_link",
            "enter second_link",
            "leave second_link",
            "leave first_link",
        ]
    );
    assert_eq!(state.get::<i32>(COUNTER_KEY), Some(&0));
}
