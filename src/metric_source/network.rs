// Network probe: cumulative byte counters per interface from sysinfo.

use super::LOOPBACK_PREFIX;
use crate::models::NetworkReading;
use sysinfo::Networks;

/// Sums received/transmitted bytes since boot over every non-loopback interface.
pub(super) fn read() -> anyhow::Result<NetworkReading> {
    let networks = Networks::new_with_refreshed_list();
    anyhow::ensure!(
        !networks.list().is_empty(),
        "no network interfaces reported"
    );
    Ok(sum_interfaces(networks.list().iter().map(|(name, data)| {
        (
            name.as_str(),
            data.total_received(),
            data.total_transmitted(),
        )
    })))
}

/// Items are `(name, received, transmitted)`.
pub(super) fn sum_interfaces<'a>(
    interfaces: impl IntoIterator<Item = (&'a str, u64, u64)>,
) -> NetworkReading {
    let mut reading = NetworkReading::default();
    for (name, rx, tx) in interfaces {
        if name.starts_with(LOOPBACK_PREFIX) {
            continue;
        }
        reading.add_interface(rx, tx);
    }
    reading
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loopback_interfaces_are_skipped() {
        let n = sum_interfaces([
            ("lo", 9999, 9999),
            ("lo0", 50, 50),
            ("eth0", 1000, 2000),
            ("wlan0", 300, 400),
        ]);
        assert_eq!(n.in_total_bytes, 1300);
        assert_eq!(n.out_total_bytes, 2400);
    }

    #[test]
    fn only_loopback_sums_to_zero() {
        assert_eq!(sum_interfaces([("lo", 1, 1)]), NetworkReading::default());
    }
}
