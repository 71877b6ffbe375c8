// vim: tw=80
//! Call count verification

use tattle::*;

#[spy]
trait Tester {
    fn clear(&self);
    fn add(&self, s: &str);
}

#[test]
fn verify_ok() {
    let tester = SpyTester::new();
    tester.clear();
    verify(&tester).had_called_with(call!(clear())).unwrap();

    tester.add("test");
    verify(&tester).had_called_with(call!(add("test"))).unwrap();

    verify_no_more_interactions(&[&tester]).unwrap();
}

#[test]
fn wanted_but_not_invoked() {
    let tester = SpyTester::new();
    assert_eq!(
        Err(Error::WantedButNotInvoked{call: "clear()".to_owned()}),
        verify(&tester).had_called_with(call!(clear())));
}

#[test]
fn wrong_arguments() {
    let tester = SpyTester::new();
    tester.clear();
    tester.add("foo");

    verify(&tester).had_called_with(call!(clear())).unwrap();
    let r = verify(&tester).had_called_with(call!(add("bar")));
    assert!(matches!(r, Err(Error::WantedButNotInvoked{..})));
}

#[test]
fn too_little_actual_invocations() {
    let tester = SpyTester::new();
    tester.clear();
    tester.clear();

    verify(&tester).with(times(2)).had_called_with(call!(clear())).unwrap();
    assert_eq!(
        Err(Error::TooLittleActualInvocations {
            call: "clear()".to_owned(),
            wanted: 100,
            actual: 2
        }),
        verify(&tester).with(times(100)).had_called_with(call!(clear())));
}

#[test]
fn too_many_actual_invocations() {
    let tester = SpyTester::new();
    tester.clear();
    tester.clear();

    verify(&tester).with(times(2)).had_called_with(call!(clear())).unwrap();
    let r = verify(&tester).with(times(1)).had_called_with(call!(clear()));
    assert!(matches!(r,
        Err(Error::TooManyActualInvocations{wanted: 1, actual: 2, ..})));
}

#[test]
fn invoked_more_than_once() {
    let tester = SpyTester::new();
    tester.add("foo");
    tester.clear();
    tester.clear();

    verify(&tester).had_called_with(call!(add("foo"))).unwrap();
    let r = verify(&tester).had_called_with(call!(clear()));
    assert!(matches!(r, Err(Error::TooManyActualInvocations{..})));
}

#[test]
fn times_zero() {
    let tester = SpyTester::new();
    verify(&tester).with(times(0)).had_called_with(call!(clear())).unwrap();
    verify(&tester).with(times(0))
        .had_called_with(call!(add("yes, I wasn't called")))
        .unwrap();
    let r = verify(&tester).with(times(15)).had_called_with(call!(clear()));
    assert!(matches!(r, Err(Error::WantedButNotInvoked{..})));
}

#[test]
fn never_wanted_but_invoked() {
    let tester = SpyTester::new();
    tester.clear();
    let r = verify(&tester).with(times(0)).had_called_with(call!(clear()));
    assert_eq!(
        "Never wanted but invoked: clear() was called 1 time(s)",
        r.unwrap_err().to_string());
}

#[test]
fn stubs_dont_affect_counts() {
    let tester = Spy::named("tester");
    when(&tester).has_a_call(call!(add("test"))).then_return(false);
    when(&tester).has_a_call(call!(add("test"))).then_return(true);

    tester.record(Call::new("add").arg("test"));
    tester.record(Call::new("add").arg("test"));

    verify(&tester).with(times(2)).had_called_with(call!(add("test")))
        .unwrap();
}

#[test]
fn never() {
    let tester = SpyTester::new();
    tester.add("one");

    verify(&tester).with(tattle::never()).had_called_with(call!(add("two")))
        .unwrap();
    verify(&tester).with(tattle::never()).had_called_with(call!(clear()))
        .unwrap();
    let r = verify(&tester).with(tattle::never())
        .had_called_with(call!(add("one")));
    assert!(matches!(r, Err(Error::NeverWantedButInvoked{actual: 1, ..})));
}

#[test]
fn at_least_and_at_most() {
    let tester = SpyTester::new();
    tester.clear();
    tester.clear();
    tester.clear();

    verify(&tester).with(at_least(2)).had_called_with(call!(clear())).unwrap();
    verify(&tester).with(at_least_once()).had_called_with(call!(clear()))
        .unwrap();
    verify(&tester).with(at_most(3)).had_called_with(call!(clear())).unwrap();
    assert!(matches!(
        verify(&tester).with(at_least(4)).had_called_with(call!(clear())),
        Err(Error::TooLittleActualInvocations{wanted: 4, actual: 3, ..})));
    assert!(matches!(
        verify(&tester).with(at_most(2)).had_called_with(call!(clear())),
        Err(Error::TooManyActualInvocations{wanted: 2, actual: 3, ..})));
    assert!(matches!(
        verify(&tester).with(at_most(2)).had_called_with(call!(add("x"))),
        Err(Error::WantedButNotInvoked{..})));
}

#[test]
fn instance_of_matches_any_value() {
    let tester = SpyTester::new();
    tester.add("a");
    tester.add("b");
    verify(&tester).with(times(2))
        .had_called_with(call!(add(instance_of::<String>())))
        .unwrap();
    verify(&tester).with(tattle::never())
        .had_called_with(call!(add(instance_of::<u32>())))
        .unwrap();
}

#[test]
fn verify_zero_interaction_fails() {
    let tester = SpyTester::new();
    verify_zero_interaction(&tester).unwrap();
    tester.add("x");
    assert_eq!(
        Err(Error::NoInteractionWanted {
            spy: "Tester".to_owned(),
            calls: vec!["add(\"x\")".to_owned()]
        }),
        verify_zero_interaction(&tester));
}

#[test]
fn verify_no_more_interactions_lists_leftovers() {
    let tester = SpyTester::new();
    tester.clear();
    tester.add("a");
    tester.add("b");
    verify(&tester).had_called_with(call!(add("a"))).unwrap();

    let e = verify_no_more_interactions(&[&tester]).unwrap_err();
    assert_eq!(
        "No interactions wanted on Tester, but found: clear(), add(\"b\")",
        e.to_string());
}

#[test]
fn verify_no_more_interactions_across_spies() {
    let a = SpyTester::new();
    let b = Spy::named("b");
    a.clear();
    b.record(Call::new("ping"));
    verify(&a).had_called_with(call!(clear())).unwrap();

    let r = verify_no_more_interactions(&[&a, &b]);
    assert!(matches!(r, Err(Error::NoInteractionWanted{ref spy, ..})
                     if spy == "b"));
    verify(&b).had_called_with(call!(ping())).unwrap();
    verify_no_more_interactions(&[&a, &b]).unwrap();
}

/// Every successful verification claims the calls it counted, even if an
/// earlier verification already claimed them.
#[test]
fn verifying_twice() {
    let tester = SpyTester::new();
    tester.clear();
    verify(&tester).had_called_with(call!(clear())).unwrap();
    verify(&tester).had_called_with(call!(clear())).unwrap();
    assert!(matches!(verify_no_more_interactions(&[&tester]),
                     Err(Error::NoInteractionWanted{..})));
}

#[test]
fn reset() {
    let tester = SpyTester::new();
    tester.clear();
    verify(&tester).had_called_with(call!(clear())).unwrap();

    tester.spy().reset();
    verify_zero_interaction(&tester).unwrap();
    verify_no_more_interactions(&[&tester]).unwrap();

    tester.clear();
    assert!(verify_no_more_interactions(&[&tester]).is_err());
}

mod attributes {
    use super::*;

    #[test]
    fn verify_through_a_view() {
        let spy = Spy::named("client");
        let conn = spy.attr("conn");
        conn.record(Call::new("send").arg(1u8));
        spy.record(Call::new("close"));

        verify(&conn).had_called_with(call!(send(1u8))).unwrap();
        verify_zero_interaction(&spy.attr("other")).unwrap();
        verify_no_more_interactions(&[&conn]).unwrap();
        // close() is still unverified
        assert!(verify_no_more_interactions(&[&spy]).is_err());
        verify(&spy).had_called_with(call!(close())).unwrap();
        verify_no_more_interactions(&[&spy]).unwrap();
    }

    #[test]
    fn dotted_patterns() {
        let spy = Spy::named("client");
        spy.attr("conn").record(Call::new("send").arg(1u8));

        verify(&spy).had_called_with(call!(conn.send(1u8))).unwrap();
        verify(&spy).with(tattle::never()).had_called_with(call!(send(1u8)))
            .unwrap();
    }

    #[test]
    fn kwargs() {
        let spy = Spy::named("http");
        spy.record(Call::new("get").arg("/").kwarg("timeout", 30u32));

        verify(&spy).with(tattle::never())
            .had_called_with(call!(get("/")))
            .unwrap();
        verify(&spy)
            .had_called_with(call!(get("/")).kwarg("timeout", 30u32))
            .unwrap();
    }
}
