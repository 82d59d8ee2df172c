//! Concurrent first use of the process-wide deny-list. Own test binary so the
//! cache is still empty when the threads start.

use std::sync::{Arc, Barrier};
use std::thread;

use localexec_runner::{DenyList, deny_list};

#[test]
fn concurrent_first_reads_share_one_list() -> thread::Result<()> {
    const THREADS: usize = 8;
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                deny_list() as *const DenyList as usize
            })
        })
        .collect();

    let mut addresses = Vec::with_capacity(THREADS);
    for handle in handles {
        addresses.push(handle.join()?);
    }

    let first = deny_list() as *const DenyList as usize;
    assert!(addresses.iter().all(|address| *address == first));
    Ok(())
}
