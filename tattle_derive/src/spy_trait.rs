// vim: tw=80
//! Code generation for `#[spy]` on a trait definition.

use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote};
use syn::{
    Error,
    FnArg,
    GenericArgument,
    ItemTrait,
    Pat,
    PathArguments,
    ReturnType,
    Signature,
    TraitItem,
    Type,
    spanned::Spanned
};

/// Add `err` to the errors collected so far
fn push_error(errors: &mut Option<Error>, err: Error) {
    match errors {
        Some(e) => e.combine(err),
        None => *errors = Some(err)
    }
}

/// If `ty` looks like `Result<T, E>`, return `T` and `E`.
///
/// Single-argument aliases like `io::Result<T>` don't qualify.
fn result_types(ty: &Type) -> Option<(&Type, &Type)> {
    let tp = match ty {
        Type::Path(tp) if tp.qself.is_none() => tp,
        _ => return None
    };
    let seg = tp.path.segments.last()?;
    if seg.ident != "Result" {
        return None;
    }
    let abga = match &seg.arguments {
        PathArguments::AngleBracketed(abga) => abga,
        _ => return None
    };
    let mut types = abga.args.iter()
        .filter_map(|ga| match ga {
            GenericArgument::Type(t) => Some(t),
            _ => None
        });
    match (types.next(), types.next(), types.next()) {
        (Some(t), Some(e), None) => Some((t, e)),
        _ => None
    }
}

/// Find a reference or lifetime argument anywhere in `ty` that isn't
/// `'static`.
fn nonstatic_lifetime(ty: &Type) -> Option<Span> {
    match ty {
        Type::Reference(r) => match &r.lifetime {
            Some(l) if l.ident == "static" => nonstatic_lifetime(&r.elem),
            _ => Some(r.span())
        },
        Type::Path(tp) => {
            let qself = tp.qself.as_ref()
                .and_then(|q| nonstatic_lifetime(&q.ty));
            qself.or_else(|| tp.path.segments.iter()
                .filter_map(|seg| match &seg.arguments {
                    PathArguments::AngleBracketed(abga) => Some(abga),
                    _ => None
                }).flat_map(|abga| abga.args.iter())
                .find_map(|ga| match ga {
                    GenericArgument::Type(t) => nonstatic_lifetime(t),
                    GenericArgument::Lifetime(l) if l.ident != "static" => {
                        Some(l.span())
                    },
                    _ => None
                }))
        },
        Type::Array(a) => nonstatic_lifetime(&a.elem),
        Type::Group(g) => nonstatic_lifetime(&g.elem),
        Type::Paren(p) => nonstatic_lifetime(&p.elem),
        Type::Ptr(p) => nonstatic_lifetime(&p.elem),
        Type::Slice(s) => nonstatic_lifetime(&s.elem),
        Type::Tuple(t) => t.elems.iter().find_map(nonstatic_lifetime),
        _ => None
    }
}

/// The expression that records one argument.  Borrowed arguments are recorded
/// by their owned form.
fn arg_expr(pat: &Pat, ty: &Type) -> Result<TokenStream, Error> {
    let ident = match pat {
        Pat::Ident(pi) if pi.subpat.is_none() => &pi.ident,
        _ => return Err(Error::new(pat.span(),
            "#[spy] requires each argument to be bound to a plain identifier"))
    };
    match ty {
        Type::ImplTrait(_) => Err(Error::new(ty.span(),
            "#[spy] does not support impl Trait arguments")),
        Type::Reference(_) => {
            Ok(quote!(::std::borrow::ToOwned::to_owned(&*#ident)))
        },
        _ => Ok(quote!(#ident))
    }
}

/// Record `call` and turn its `Outcome` into the method's return value.
///
/// Unanswered calls return the default of the concrete return type.
fn conversion(sig: &Signature, desc: &str) -> Result<TokenStream, Error> {
    let ty = match &sig.output {
        ReturnType::Default => return Ok(quote!(
            ::tattle::Spy::record(&self.spy, call).returning::<()>(#desc)
        )),
        ReturnType::Type(_, ty) => ty.as_ref()
    };
    if let Type::ImplTrait(_) = ty {
        return Err(Error::new(ty.span(),
            "#[spy] does not support returning impl Trait"));
    }
    if let Some(span) = nonstatic_lifetime(ty) {
        return Err(Error::new(span,
            "#[spy] does not support returning non-'static references"));
    }
    let (default, conv) = match result_types(ty) {
        Some((t, e)) => (
            quote!(::std::result::Result::Ok(
                (&&::tattle::DefaultAnswer::<#t>::new()).default_answer(#desc)
            )),
            quote!(returning_result::<#t, #e>(#desc))
        ),
        None => (
            quote!(
                (&&::tattle::DefaultAnswer::<#ty>::new()).default_answer(#desc)
            ),
            quote!(returning::<#ty>(#desc))
        )
    };
    Ok(quote!(
        let outcome = ::tattle::Spy::record(&self.spy, call);
        if outcome.is_default() {
            #[allow(unused_imports)]
            use ::tattle::{AnswerDefault as _, AnswerFallback as _};
            #default
        } else {
            outcome.#conv
        }
    ))
}

fn gen_method(spy_ident: &syn::Ident, sig: &Signature)
    -> Result<TokenStream, Error>
{
    if sig.receiver().is_none() {
        return Err(Error::new(sig.span(),
            "#[spy] does not support methods without a self receiver"));
    }
    if sig.generics.type_params().next().is_some() ||
        sig.generics.const_params().next().is_some()
    {
        return Err(Error::new(sig.generics.span(),
            "#[spy] does not support generic methods"));
    }
    if let Some(a) = &sig.asyncness {
        return Err(Error::new(a.span(),
            "#[spy] does not support async methods"));
    }

    let name = sig.ident.to_string();
    let desc = format!("{}::{}", spy_ident, name);
    let mut args = Vec::new();
    for fn_arg in sig.inputs.iter() {
        if let FnArg::Typed(pt) = fn_arg {
            args.push(arg_expr(&pt.pat, &pt.ty)?);
        }
    }
    let conv = conversion(sig, &desc)?;
    Ok(quote!(
        #sig {
            let call = ::tattle::Call::new(#name)
                #(.arg(#args))*;
            #conv
        }
    ))
}

pub(crate) fn do_spy(attrs: TokenStream, input: TokenStream) -> TokenStream {
    let item: ItemTrait = match syn::parse2(input) {
        Ok(item) => item,
        Err(e) => return e.to_compile_error()
    };
    match gen_spy(attrs, &item) {
        Ok(ts) => ts,
        Err(e) => e.to_compile_error()
    }
}

fn gen_spy(attrs: TokenStream, item: &ItemTrait) -> Result<TokenStream, Error>
{
    if !attrs.is_empty() {
        return Err(Error::new(attrs.span(), "#[spy] takes no arguments"));
    }
    if !item.generics.params.is_empty() {
        return Err(Error::new(item.generics.span(),
            "#[spy] does not support generic traits"));
    }

    let trait_ident = &item.ident;
    let spy_ident = format_ident!("Spy{}", trait_ident);
    let mut errors = None;
    let mut methods = Vec::new();
    for ti in item.items.iter() {
        let r = match ti {
            TraitItem::Fn(f) => gen_method(&spy_ident, &f.sig),
            TraitItem::Type(t) => Err(Error::new(t.span(),
                "#[spy] does not support associated types")),
            TraitItem::Const(c) => Err(Error::new(c.span(),
                "#[spy] does not support associated constants")),
            other => Err(Error::new(other.span(),
                "#[spy] does not support this kind of trait item"))
        };
        match r {
            Ok(m) => methods.push(m),
            Err(e) => push_error(&mut errors, e)
        }
    }
    if let Some(e) = errors {
        return Err(e);
    }

    let vis = &item.vis;
    let name = trait_ident.to_string();
    let doc = format!("Recording spy for [`{}`].", name);
    Ok(quote!(
        #[doc = #doc]
        #[derive(Clone, Debug)]
        #vis struct #spy_ident {
            spy: ::tattle::Spy
        }

        impl #spy_ident {
            /// Create a spy with no recorded calls and no stubs.
            #vis fn new() -> Self {
                #spy_ident{spy: ::tattle::Spy::named(#name)}
            }
        }

        impl ::std::default::Default for #spy_ident {
            fn default() -> Self {
                Self::new()
            }
        }

        impl ::tattle::Recordable for #spy_ident {
            fn spy(&self) -> &::tattle::Spy {
                &self.spy
            }
        }

        impl #trait_ident for #spy_ident {
            #(#methods)*
        }
    ))
}
