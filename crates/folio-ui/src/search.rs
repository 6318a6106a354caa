//! Debounced search box.

use std::time::Duration;

use leptos::{
    leptos_dom::helpers::{TimeoutHandle, set_timeout_with_handle},
    prelude::*,
};

/// Default quiet period before a typed term is applied.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Search input.
///
/// Typing updates `query` once the input has been quiet for `debounce_ms`;
/// Enter applies it immediately.
#[component]
pub fn SearchBox(
    /// Settled search term.
    query: RwSignal<String>,
    /// Placeholder text for the input.
    #[prop(default = "記事を検索...".to_string())]
    placeholder: String,
    /// Quiet period in milliseconds.
    #[prop(default = DEFAULT_DEBOUNCE_MS)]
    debounce_ms: u64,
    /// Whether a load is in flight.
    #[prop(default = false.into(), into)]
    loading: Signal<bool>,
) -> impl IntoView {
    let pending = StoredValue::new(None::<TimeoutHandle>);

    let cancel_pending = move || {
        if let Some(handle) = pending.get_value() {
            handle.clear();
        }
        pending.set_value(None);
    };

    let on_input = move |ev| {
        let value = event_target_value(&ev);
        cancel_pending();
        let handle = set_timeout_with_handle(
            move || query.set(value),
            Duration::from_millis(debounce_ms),
        )
        .ok();
        pending.set_value(handle);
    };

    let on_keydown = move |ev: web_sys::KeyboardEvent| {
        if ev.key() == "Enter" {
            ev.prevent_default();
            cancel_pending();
            query.set(event_target_value(&ev));
        }
    };

    view! {
      <div class="search-box">
        <input
          id="search-input"
          type="search"
          class="search-input"
          placeholder=placeholder
          prop:value=move || query.get()
          on:input=on_input
          on:keydown=on_keydown
        />
        <Show when=move || loading.get()>
          <span class="search-spinner" aria-label="Loading"></span>
        </Show>
      </div>
    }
}
