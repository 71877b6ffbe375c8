// vim: tw=80
//! Spies generated with `#[spy]`

use static_assertions::assert_impl_all;
use tattle::*;

#[spy]
pub trait Storage {
    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), String>;
    fn get(&self, key: &str) -> Option<Vec<u8>>;
    fn len(&self) -> usize;
    fn name(&self) -> &'static str;
    fn close(self);
    /// Methods with default implementations are spied on too
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

assert_impl_all!(SpyStorage: Clone, Default, Send, Sync, Recordable);

#[test]
fn reference_arguments() {
    let mut storage = SpyStorage::new();
    storage.put("k", &[1, 2, 3]).unwrap();

    verify(&storage)
        .had_called_with(call!(put("k", vec![1u8, 2, 3])))
        .unwrap();
    let calls = storage.spy().calls();
    assert_eq!(Some(&String::from("k")), calls[0].arg_as::<String>(0));
    assert_eq!(Some(&vec![1u8, 2, 3]), calls[0].arg_as::<Vec<u8>>(1));
}

#[test]
fn result_methods() {
    let mut storage = SpyStorage::new();
    when(&storage).has_a_call(call!(put("full", instance_of::<Vec<u8>>())))
        .then_raise(String::from("disk full"));
    when(&storage).has_a_call(call!(put("bad", instance_of::<Vec<u8>>())))
        .then_return(Err::<(), String>(String::from("bad key")));

    assert_eq!(Err(String::from("disk full")), storage.put("full", &[0]));
    assert_eq!(Err(String::from("bad key")), storage.put("bad", &[0]));
}

#[test]
fn return_default() {
    let mut storage = SpyStorage::new();
    assert_eq!(None, storage.get("k"));
    assert_eq!(0, storage.len());
    assert_eq!("", storage.name());
    assert_eq!(Ok(()), storage.put("k", &[]));
}

mod without_default {
    use super::*;

    #[derive(Debug, PartialEq)]
    pub struct Handle(u32);

    #[spy]
    pub trait Opener {
        fn open(&self) -> Handle;
    }

    #[test]
    fn stubbed() {
        let opener = SpyOpener::new();
        when(&opener).has_a_call(call!(open())).then_answer(|_| Handle(3));
        assert_eq!(Handle(3), opener.open());
    }

    #[test]
    #[should_panic(expected = "SpyOpener::open: no stub matched.")]
    fn unstubbed() {
        let opener = SpyOpener::new();
        opener.open();
    }
}

#[test]
fn stubbed_values() {
    let storage = SpyStorage::new();
    when(&storage).has_a_call(call!(get("a"))).then_return(Some(vec![1u8]));
    when(&storage).has_a_call(call!(len())).then_return(1usize);
    when(&storage).has_a_call(call!(name())).then_return("mem");

    assert_eq!(Some(vec![1]), storage.get("a"));
    assert_eq!(1, storage.len());
    assert_eq!("mem", storage.name());
}

#[test]
fn default_methods_are_replaced() {
    let storage = SpyStorage::new();
    when(&storage).has_a_call(call!(is_empty())).then_return(true);

    assert!(storage.is_empty());
    verify(&storage).had_called_with(call!(is_empty())).unwrap();
    verify(&storage).with(never()).had_called_with(call!(len())).unwrap();
}

#[test]
#[should_panic(expected = "SpyStorage::len: stubbed answer is not a usize")]
fn stubbed_value_of_the_wrong_type() {
    let storage = SpyStorage::new();
    when(&storage).has_a_call(call!(len())).then_return(1u32);
    storage.len();
}

#[test]
fn by_value_receiver() {
    let storage = SpyStorage::new();
    let observer = storage.clone();
    storage.close();
    verify(&observer).had_called_with(call!(close())).unwrap();
}

#[test]
fn default_names_the_spy_after_the_trait() {
    let storage = SpyStorage::default();
    assert_eq!("Storage", storage.spy().name());
}

#[test]
fn send_to_another_thread() {
    let storage = SpyStorage::new();
    when(&storage).has_a_call(call!(len())).then_return(7usize);
    let s2 = storage.clone();
    let len = std::thread::spawn(move || s2.len()).join().unwrap();
    assert_eq!(7, len);
    verify(&storage).had_called_with(call!(len())).unwrap();
}

/// Crates like Anyhow redefine `Result` and `Ok`.
mod result_alias {
    use super::*;

    pub type Result<T, E = String> = std::result::Result<T, E>;

    #[allow(non_snake_case)]
    pub fn Ok<T>(t: T) -> Result<T> {
        Result::Ok(t)
    }

    #[spy]
    pub trait Foo {
        fn foo(&self) -> Result<u32, String>;
        fn bar(&self) -> Result<u32>;
    }

    #[test]
    fn two_argument_alias() {
        let foo = SpyFoo::new();
        when(&foo).has_a_call(call!(foo())).then_raise(String::from("e"));
        assert_eq!(Err(String::from("e")), foo.foo());
    }

    #[test]
    fn one_argument_alias() {
        let foo = SpyFoo::new();
        when(&foo).has_a_call(call!(bar())).then_return(Ok(5u32));
        assert_eq!(Ok(5), foo.bar());
    }
}

/// Hand-written spies work with every verification function.
mod manual {
    use super::*;

    trait Clock {
        fn sleep(&self, ms: u64, reason: &str);
    }

    struct FakeClock {
        spy: Spy
    }

    impl Recordable for FakeClock {
        fn spy(&self) -> &Spy {
            &self.spy
        }
    }

    impl Clock for FakeClock {
        fn sleep(&self, ms: u64, reason: &str) {
            let call = Call::new("sleep")
                .arg(ms)
                .kwarg("reason", reason.to_owned());
            self.record(call).returning("FakeClock::sleep")
        }
    }

    #[test]
    fn kwargs() {
        let clock = FakeClock{spy: Spy::named("clock")};
        clock.sleep(10, "backoff");
        verify(&clock)
            .had_called_with(call!(sleep(10u64)).kwarg("reason", "backoff"))
            .unwrap();
        verify_no_more_interactions(&[&clock]).unwrap();
    }
}
