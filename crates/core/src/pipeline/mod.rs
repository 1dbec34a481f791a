pub mod event_log;
pub mod stream_benchmark_use_case;
