mod common;

use common::{driver, MemoryPeer, REQUEST_BUDGET};
use proxynvm_driver::{ServiceStatus, SharedNvm, StorageService};
use proxynvm_frame::{Command, Status};

#[test]
fn service_over_remote_driver() {
    let mut service = StorageService::new(driver(MemoryPeer::new(300)));
    let mut dataport = vec![0u8; 128];
    for (i, byte) in dataport.iter_mut().enumerate() {
        *byte = i as u8;
    }

    let reply = service.write(100, 100, &dataport);
    assert!(reply.is_success());
    assert_eq!(reply.count, 100);

    let mut readback = vec![0u8; 128];
    let reply = service.read(100, 100, &mut readback);
    assert!(reply.is_success());
    assert_eq!(&readback[..100], &dataport[..100]);

    assert_eq!(service.get_size().count, 300);
    assert_eq!(service.get_state().status, ServiceStatus::NotSupported);
}

#[test]
fn failed_chunk_reports_generic_with_zero_count() {
    let peer = MemoryPeer::new(300).fail_nth_write(2, Status::Write);
    let mut service = StorageService::new(driver(peer));
    let dataport = vec![0xA5u8; 3 * REQUEST_BUDGET];

    let reply = service.erase(0, dataport.len() as u64);
    assert_eq!(reply.status, ServiceStatus::Generic);
    assert_eq!(reply.count, 0);

    let peer = service.into_inner().into_inner();
    assert_eq!(peer.chunks(Command::Write).len(), 2);
}

#[test]
fn out_of_range_service_call_is_generic() {
    let mut service = StorageService::new(driver(MemoryPeer::new(64)));
    let dataport = [0u8; 16];
    let reply = service.write(60, 16, &dataport);
    assert_eq!(reply.status, ServiceStatus::Generic);
    assert_eq!(reply.count, 0);
}

#[test]
fn shared_driver_serializes_threads() {
    let shared = SharedNvm::new(driver(MemoryPeer::new(4 * 64)));

    let workers: Vec<_> = (0..4u8)
        .map(|i| {
            let shared = shared.clone();
            std::thread::spawn(move || {
                let mut service = StorageService::new(shared);
                let block = [i; 64];
                assert!(service.write(u64::from(i) * 64, 64, &block).is_success());
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("worker should not panic");
    }

    let mut service = StorageService::new(shared);
    let mut dataport = [0u8; 256];
    assert!(service.read(0, 256, &mut dataport).is_success());
    for (i, block) in dataport.chunks(64).enumerate() {
        assert!(block.iter().all(|&b| b == i as u8));
    }
}
