// vim: tw=80
//! Proc Macros for use with Tattle
//!
//! You probably don't want to use this crate directly.  Instead, you use
//! its reexports via the [`tattle`](../tattle/index.html) crate.

extern crate proc_macro;

mod spy_trait;
use crate::spy_trait::do_spy;

/// Generate a recording spy for a trait.
///
/// For a trait `Foo`, `#[spy]` generates a struct named `SpyFoo`, with the
/// trait's visibility, that implements `Foo` and
/// [`Recordable`](../tattle/trait.Recordable.html).  Every call of a trait
/// method is recorded under the method's name, with its arguments in order,
/// and answered from the stubs declared with `when`.
///
/// * Arguments passed by reference are recorded by their owned form, so a
///   `&str` argument is recorded as a `String` and a `&[u8]` as a `Vec<u8>`.
///   All recorded types must be `PartialEq + Debug + Send + Sync + 'static`.
/// * Methods returning `Result<T, E>` return `Err` for answers declared with
///   `then_raise`.  Any other method panics instead.
/// * Methods that no stub answers return `Default::default()`, or `Ok` of
///   the default for `Result<T, E>`.  They panic if the type has no default.
///
/// Static methods, generic methods, async methods, associated types and
/// associated constants are not supported.
///
/// # Examples
/// ```ignore
/// use tattle::*;
///
/// #[spy]
/// pub trait Greeter {
///     fn greet(&self, name: &str) -> String;
/// }
///
/// let greeter = SpyGreeter::new();
/// when(&greeter).has_a_call(call!(greet("Ann")))
///     .then_return(String::from("Hi, Ann"));
/// assert_eq!("Hi, Ann", greeter.greet("Ann"));
/// verify(&greeter).had_called_with(call!(greet("Ann"))).unwrap();
/// ```
#[proc_macro_attribute]
pub fn spy(attrs: proc_macro::TokenStream, input: proc_macro::TokenStream)
    -> proc_macro::TokenStream
{
    let input: proc_macro2::TokenStream = input.into();
    let mut output = input.clone();
    output.extend(do_spy(attrs.into(), input));
    output.into()
}
