/// Installs `env_logger` for a test. Output is captured by the test harness,
/// use `RUST_LOG=debug` to see the store's log messages.
pub fn test_logger() {
    if cfg!(not(feature = "termpool_miri")) {
        // Tests run in parallel, so the logger may already be installed.
        let _ = env_logger::builder().is_test(true).try_init();
    }
}

/// Runs `test_function` on `num_threads` threads, each with its own state
/// produced by `init_function`, and waits for all of them. Panics if any of
/// the threads panicked.
pub fn test_threads<C, F, G>(num_threads: usize, init_function: G, test_function: F)
where
    C: Send + 'static,
    F: Fn(&mut C) + Copy + Send + Sync + 'static,
    G: Fn() -> C,
{
    test_logger();

    let threads: Vec<_> = (0..num_threads)
        .map(|_| {
            let mut state = init_function();
            std::thread::spawn(move || test_function(&mut state))
        })
        .collect();

    for thread in threads {
        thread.join().expect("A test thread panicked");
    }
}
