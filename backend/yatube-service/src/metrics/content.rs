use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};

lazy_static! {
    /// Index page cache events (hit/miss/error).
    pub static ref INDEX_CACHE_EVENTS: IntCounterVec = register_int_counter_vec!(
        "yatube_index_cache_events_total",
        "Index page cache events segmented by outcome",
        &["event"]
    )
    .expect("failed to register yatube_index_cache_events_total");

    /// Index page cache write results (success/error).
    pub static ref INDEX_CACHE_WRITE_TOTAL: IntCounterVec = register_int_counter_vec!(
        "yatube_index_cache_write_total",
        "Index page cache write attempts segmented by outcome",
        &["result"]
    )
    .expect("failed to register yatube_index_cache_write_total");

    /// Rows created through the site (post/comment/follow/user).
    pub static ref CONTENT_CREATED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "yatube_content_created_total",
        "Content created through the site segmented by kind",
        &["kind"]
    )
    .expect("failed to register yatube_content_created_total");

    /// Form submissions rejected by validation, by form.
    pub static ref FORM_REJECTIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "yatube_form_rejections_total",
        "Form submissions that failed validation segmented by form",
        &["form"]
    )
    .expect("failed to register yatube_form_rejections_total");
}
