/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */
#![forbid(unsafe_code)]

//! Crossbar Macro Library
//!
//! Procedural macros for the Crossbar actor framework, removing the
//! boilerplate around message and actor-state declarations. The generated
//! trait implementations reference the `crossbar` facade crate, so these
//! attributes are meant to be used through its prelude.
//!
//! # Message Macro
//!
//! The [`crossbar_message`] macro declares message types:
//!
//! ```ignore
//! // A broadcast: fan-out, no reply.
//! #[crossbar_message(broadcast)]
//! pub struct Tick { pub count: u64 }
//!
//! // An event: round-robin to one subscriber, replied to with a u32.
//! #[crossbar_message(reply(u32))]
//! pub struct ScanRegion { pub sector: u8 }
//!
//! // A plain message usable with `act_on` dispatch only.
//! #[crossbar_message]
//! pub struct Nudge;
//! ```
//!
//! # Actor Macro
//!
//! The [`crossbar_actor`] macro declares actor state (model) types:
//!
//! ```ignore
//! #[crossbar_actor]
//! pub struct Counter {
//!     count: i32,
//! }
//! ```
//!
//! # Main Entry Point
//!
//! The [`crossbar_main`] macro sets up the async runtime for a Crossbar
//! application:
//!
//! ```ignore
//! use crossbar::prelude::*;
//!
//! #[crossbar_main]
//! async fn main() {
//!     let mut app = CrossbarApp::launch();
//!     // ... your application logic
//!     app.shutdown_all().await;
//! }
//! ```

use proc_macro::TokenStream;

use quote::quote;
use syn::{parse_macro_input, DeriveInput, ItemFn};

fn has_derive(input: &DeriveInput, trait_name: &str) -> bool {
    input.attrs.iter().any(|attr| {
        if attr.path().is_ident("derive") {
            let mut found = false;
            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident(trait_name) {
                    found = true;
                }
                Ok(())
            });
            found
        } else {
            false
        }
    })
}

/// Configuration options parsed from `#[crossbar_message(...)]` attributes.
#[derive(Default)]
struct MessageConfig {
    /// Implement `Broadcast` for the type.
    broadcast: bool,
    /// Implement `Event` with this reply type.
    reply: Option<syn::Type>,
}

impl MessageConfig {
    /// Parse configuration from attribute tokens.
    fn parse(attr: &TokenStream) -> Result<Self, String> {
        let mut config = Self::default();

        let attr_string = attr.to_string();
        for part in attr_string.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed == "broadcast" {
                config.broadcast = true;
            } else if let Some(inner) = trimmed
                .strip_prefix("reply")
                .map(str::trim)
                .and_then(|rest| rest.strip_prefix('('))
                .and_then(|rest| rest.strip_suffix(')'))
            {
                match syn::parse_str::<syn::Type>(inner.trim()) {
                    Ok(reply_type) => config.reply = Some(reply_type),
                    Err(_) => return Err(format!("invalid reply type: `{}`", inner.trim())),
                }
            } else {
                return Err(format!("unknown crossbar_message option: `{trimmed}`"));
            }
        }

        if config.broadcast && config.reply.is_some() {
            return Err("a message is either a broadcast or an event, not both".to_string());
        }

        Ok(config)
    }
}

/// Configuration options parsed from `#[crossbar_actor(...)]` attributes.
#[derive(Default)]
struct ActorConfig {
    /// Skip deriving Default (user will implement it manually).
    no_default: bool,
}

impl ActorConfig {
    /// Parse configuration from attribute tokens.
    fn parse(attr: &TokenStream) -> Self {
        let mut config = Self::default();

        let attr_string = attr.to_string();
        for part in attr_string.split(',') {
            let trimmed = part.trim();
            if trimmed == "no_default" {
                config.no_default = true;
            }
        }

        config
    }
}

/// A procedural macro to derive the necessary traits for a Crossbar message.
///
/// Ensures the annotated type derives `Clone` and `Debug` (unless already
/// present), asserts `Send + Sync + 'static` at compile time, and implements
/// the message-kind marker the options select:
///
/// * `#[crossbar_message(broadcast)]` — implements
///   `crossbar::prelude::Broadcast`: fan-out delivery, no reply.
/// * `#[crossbar_message(reply(T))]` — implements
///   `crossbar::prelude::Event` with `Reply = T`: round-robin delivery to one
///   subscriber, replied to through `complete`.
/// * `#[crossbar_message]` — neither marker; the type can still be delivered
///   to `act_on` handlers (lifecycle signals and reply payloads fall in this
///   bucket).
#[proc_macro_attribute]
pub fn crossbar_message(attr: TokenStream, item: TokenStream) -> TokenStream {
    // Parse configuration from attributes
    let config = match MessageConfig::parse(&attr) {
        Ok(config) => config,
        Err(message) => {
            return syn::Error::new(proc_macro2::Span::call_site(), message)
                .to_compile_error()
                .into()
        }
    };

    // Parse the input tokens into a syntax tree.
    let input = parse_macro_input!(item as DeriveInput);

    // Get the name and generics of the struct.
    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    // Determine which traits need to be derived
    let need_clone = !has_derive(&input, "Clone");
    let need_debug = !has_derive(&input, "Debug");

    // Build the list of traits to derive
    let derives = {
        let mut traits = Vec::new();
        if need_clone {
            traits.push(quote!(Clone));
        }
        if need_debug {
            traits.push(quote!(Debug));
        }
        if traits.is_empty() {
            quote!()
        } else {
            quote!(#[derive(#(#traits),*)])
        }
    };

    let marker_impl = if config.broadcast {
        quote! {
            impl #impl_generics ::crossbar::prelude::Broadcast for #name #ty_generics #where_clause {}
        }
    } else if let Some(reply_type) = &config.reply {
        quote! {
            impl #impl_generics ::crossbar::prelude::Event for #name #ty_generics #where_clause {
                type Reply = #reply_type;
            }
        }
    } else {
        quote!()
    };

    // Generate a unique identifier for the static assertion to avoid conflicts
    let assert_ident = quote::format_ident!("_AssertCrossbarMessage_{}", name);

    let expanded = quote! {
        #derives
        #input

        #marker_impl

        // Compile-time assertion that the message type satisfies Send + Sync + 'static.
        // This catches invalid message types early with clear error messages.
        #[doc(hidden)]
        #[allow(dead_code, non_camel_case_types, non_snake_case, clippy::needless_lifetimes)]
        const _: () = {
            fn #assert_ident #impl_generics () #where_clause {
                fn assert_bounds<T: Send + Sync + 'static>() {}
                assert_bounds::<#name #ty_generics>();
            }
        };
    };

    // Return the generated tokens.
    TokenStream::from(expanded)
}

/// A procedural macro to derive boilerplate traits for Crossbar actor state.
///
/// Actor state (model) types must implement `Default` because actors are
/// created with their default state before handlers are registered. This
/// macro derives `Default` and `Debug` (unless already present) and asserts
/// `Send + 'static` at compile time.
///
/// # Options
///
/// ## `no_default`
///
/// Skip deriving `Default` when you need to implement it manually (e.g., when
/// a field's type doesn't implement `Default`):
///
/// ```ignore
/// use std::io::{stdout, Stdout};
///
/// #[crossbar_actor(no_default)]
/// struct Printer {
///     out: Stdout,
/// }
///
/// impl Default for Printer {
///     fn default() -> Self {
///         Self { out: stdout() }
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn crossbar_actor(attr: TokenStream, item: TokenStream) -> TokenStream {
    // Parse configuration from attributes
    let config = ActorConfig::parse(&attr);

    // Parse the input tokens into a syntax tree.
    let input = parse_macro_input!(item as DeriveInput);

    // Get the name and generics of the struct.
    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    // Determine which traits need to be derived
    let need_default = !config.no_default && !has_derive(&input, "Default");
    let need_debug = !has_derive(&input, "Debug");

    // Build the list of traits to derive
    let derives = {
        let mut traits = Vec::new();
        if need_default {
            traits.push(quote!(Default));
        }
        if need_debug {
            traits.push(quote!(Debug));
        }
        if traits.is_empty() {
            quote!()
        } else {
            quote!(#[derive(#(#traits),*)])
        }
    };

    // Generate a unique identifier for the static assertion to avoid conflicts
    let assert_ident = quote::format_ident!("_AssertCrossbarActor_{}", name);

    let expanded = quote! {
        #derives
        #input

        // Compile-time assertion that the actor type satisfies Send + 'static.
        // This catches invalid actor types early with clear error messages.
        #[doc(hidden)]
        #[allow(dead_code, non_camel_case_types, non_snake_case, clippy::needless_lifetimes)]
        const _: () = {
            fn #assert_ident #impl_generics () #where_clause {
                fn assert_bounds<T: Send + 'static>() {}
                assert_bounds::<#name #ty_generics>();
            }
        };
    };

    // Return the generated tokens.
    TokenStream::from(expanded)
}

/// Entry point macro for Crossbar applications.
///
/// Marks an async function as the entry point, building the tokio runtime
/// automatically.
///
/// # Configuration
///
/// - `flavor`: The runtime flavor (`"multi_thread"` or `"current_thread"`)
/// - `worker_threads`: Number of worker threads (only for multi-threaded runtime)
///
/// ```ignore
/// // Use single-threaded runtime
/// #[crossbar_main(flavor = "current_thread")]
/// async fn main() { }
///
/// // Specify worker thread count
/// #[crossbar_main(worker_threads = 4)]
/// async fn main() { }
/// ```
///
/// The default is a multi-threaded runtime with the default number of worker
/// threads.
#[proc_macro_attribute]
pub fn crossbar_main(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let body = &input.block;

    // Validate that the function is async
    if sig.asyncness.is_none() {
        return syn::Error::new_spanned(
            sig.fn_token,
            "the async keyword is missing from the function declaration",
        )
        .to_compile_error()
        .into();
    }

    // Validate function name is main
    if sig.ident != "main" {
        return syn::Error::new_spanned(
            &sig.ident,
            "crossbar_main can only be applied to the main function",
        )
        .to_compile_error()
        .into();
    }

    // Parse configuration attributes
    let attr_string = attr.to_string();
    let use_current_thread = attr_string.contains("current_thread");

    // Extract worker_threads if specified
    let worker_threads: Option<usize> = attr_string
        .split(',')
        .find(|s| s.contains("worker_threads"))
        .and_then(|s| s.split('=').nth(1).and_then(|v| v.trim().parse().ok()));

    // Generate the runtime builder based on configuration
    let runtime_builder = if use_current_thread {
        quote! {
            ::crossbar::prelude::tokio::runtime::Builder::new_current_thread()
        }
    } else if let Some(threads) = worker_threads {
        quote! {
            ::crossbar::prelude::tokio::runtime::Builder::new_multi_thread()
                .worker_threads(#threads)
        }
    } else {
        quote! {
            ::crossbar::prelude::tokio::runtime::Builder::new_multi_thread()
        }
    };

    // Create the sync function signature (remove async)
    let fn_name = &sig.ident;
    let fn_inputs = &sig.inputs;
    let fn_output = &sig.output;

    let expanded = quote! {
        #(#attrs)*
        #vis fn #fn_name(#fn_inputs) #fn_output {
            #runtime_builder
                .enable_all()
                .build()
                .expect("Failed to build Crossbar runtime")
                .block_on(async #body)
        }
    };

    TokenStream::from(expanded)
}
