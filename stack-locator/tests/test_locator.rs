// Copyright 2026 The stack-locator Developers. See the COPYRIGHT
// file at the top-level directory of this distribution.

use stack_locator::{LocatorError, StackLocator};
use stack_locator_synth::SynthStack;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

struct TestFixture {
    pub stack: SynthStack,
}

impl TestFixture {
    /// `main` calls `AppCode::do_work`, which calls `LoggerImpl::log`, which
    /// calls itself once.
    pub fn new() -> TestFixture {
        init_logging();
        TestFixture {
            stack: SynthStack::new()
                .call("app::Main", "main")
                .call("app::AppCode", "do_work")
                .call("log::LoggerImpl", "log")
                .recurse(1),
        }
    }

    pub fn locator(&self) -> StackLocator<&SynthStack> {
        StackLocator::from_source(&self.stack)
    }
}

#[test]
fn test_calc_location_skips_facade() {
    let f = TestFixture::new();
    let location = f.locator().calc_location("log::LoggerImpl").unwrap();
    assert_eq!(location.class_name(), "app::AppCode");
    assert_eq!(location.method_name(), "do_work");
    assert_eq!(location.file().unwrap().to_str(), Some("app/AppCode.rs"));
    assert_eq!(location.line(), Some(20));
    assert_eq!(location.to_string(), "app::AppCode::do_work(app/AppCode.rs:20)");
}

#[test]
fn test_calc_location_without_facade() {
    let f = TestFixture::new();
    assert_eq!(f.locator().calc_location("log::Other"), None);
    // The facade is the outermost frame: nothing called it.
    let stack = SynthStack::new().call("log::LoggerImpl", "log").recurse(2);
    assert_eq!(StackLocator::from_source(&stack).calc_location("log::LoggerImpl"), None);
}

#[test]
fn test_missing_sentinel_is_absent() {
    let f = TestFixture::new();
    let locator = f.locator();
    let predicates: [fn(&str) -> bool; 2] = [|_| true, |_| false];
    for predicate in predicates {
        assert_eq!(locator.caller_class("missing::Sentinel", predicate), Ok(None));
    }
}

#[test]
fn test_empty_sentinel_fails_before_walking() {
    let f = TestFixture::new();
    let result = f.locator().caller_class("", |_| true);
    assert_eq!(result, Err(LocatorError::InvalidArgument("sentinel class")));
    assert_eq!(result.unwrap_err().to_string(), "sentinel class cannot be empty");
    assert_eq!(f.stack.frames_pulled(), 0);
}

#[test]
fn test_sentinel_and_predicate() {
    let f = TestFixture::new();
    let locator = f.locator();
    assert_eq!(
        locator.caller_class("log::LoggerImpl", |_| true),
        Ok(Some("app::AppCode".to_string()))
    );
    assert_eq!(
        locator.caller_class("log::LoggerImpl", |class| class.starts_with("app::Main")),
        Ok(Some("app::Main".to_string()))
    );
}

#[test]
fn test_typed_lookups_agree() {
    struct Facade;
    struct Caller;
    let facade = stack_locator::class_of::<Facade>();
    let caller = stack_locator::class_of::<Caller>();
    let stack = SynthStack::new()
        .call("app::Main", "main")
        .call(&caller, "run")
        .call(&facade, "info")
        .call(&facade, "log");
    let locator = StackLocator::from_source(&stack);

    assert_eq!(locator.caller_of::<Facade>(), Some(caller.clone()));
    assert_eq!(locator.caller_class_by_anchor(&facade), Some(caller.clone()));
    assert_eq!(locator.caller_class_of::<Facade, _>(|_| true), Some(caller.clone()));
    assert_eq!(locator.caller_class(&facade, |_| true), Ok(Some(caller)));
}

#[test]
fn test_anchor_recursion_returns_outermost_caller() {
    let stack = SynthStack::new()
        .call("app::Main", "main")
        .call("app::Walker", "visit")
        .call("app::Anchor", "descend")
        .recurse(4)
        .call("app::Leaf", "touch");
    let locator = StackLocator::from_source(&stack);
    assert_eq!(
        locator.caller_class_by_anchor("app::Anchor").as_deref(),
        Some("app::Walker")
    );
    assert_eq!(locator.caller_class_by_anchor("app::Missing"), None);
}

#[test]
fn test_package_prefix() {
    let stack = SynthStack::new()
        .call("app::Main", "main")
        .call("app::service::Handler", "handle")
        .call("lib::Adapter", "forward")
        .call("log::Logger", "info")
        .call("log::Logger", "log");
    let locator = StackLocator::from_source(&stack);
    assert_eq!(
        locator.caller_class_in_package("log::Logger", "app::").as_deref(),
        Some("app::service::Handler")
    );
    // An empty prefix is the same as skipping only by name.
    assert_eq!(
        locator.caller_class_in_package("log::Logger", ""),
        locator.caller_class_after("log::Logger")
    );
    assert_eq!(
        locator.caller_class_after("log::Logger").as_deref(),
        Some("lib::Adapter")
    );
}

#[test]
fn test_depth_lookups() {
    let f = TestFixture::new();
    let locator = f.locator();
    let depth = f.stack.depth() as isize;
    let frames = f.stack.frames();

    for d in 0..depth {
        let class = locator.caller_class_at(d).unwrap();
        assert_eq!(class.as_deref(), Some(frames[d as usize].class_name.as_str()));
        let element = locator.stack_trace_element(d).unwrap().unwrap();
        assert_eq!(element, frames[d as usize].to_location());
    }
    assert_eq!(locator.caller_class_at(depth), Ok(None));
    assert_eq!(locator.stack_trace_element(depth), Ok(None));
    assert_eq!(locator.caller_class_at(-1), Err(LocatorError::OutOfBounds(-1)));
    assert_eq!(
        locator.stack_trace_element(isize::MIN),
        Err(LocatorError::OutOfBounds(isize::MIN))
    );
}

#[test]
fn test_current_stack_trace() {
    let f = TestFixture::new();
    let trace = f.locator().current_stack_trace();
    assert_eq!(
        trace,
        ["log::LoggerImpl", "log::LoggerImpl", "app::AppCode", "app::Main"]
    );
    assert_eq!(trace.len(), f.stack.depth());
}

#[test]
fn test_early_match_stops_walk() {
    let stack = SynthStack::new()
        .call("app::Main", "main")
        .recurse(50)
        .call("app::AppCode", "do_work")
        .call("log::LoggerImpl", "log");
    let locator = StackLocator::from_source(&stack);
    assert!(locator.calc_location("log::LoggerImpl").is_some());
    assert_eq!(stack.frames_pulled(), 2);
    assert_eq!(locator.caller_class_at(1), Ok(Some("app::AppCode".to_string())));
    assert_eq!(stack.frames_pulled(), 2);
}
