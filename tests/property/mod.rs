mod append_monotonic;
mod stream_decoding;
