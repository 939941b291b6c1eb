//! Bus-attached memory device.
//!
//! One type serves system RAM, PRG-ROM, CHR-ROM, the trainer and misc ROM: a block of bytes
//! bound to `[min_addr, max_addr]` and indexed through a mirroring mask, so a 2 KiB RAM can
//! answer the whole $0000-$1FFF window (mask $07FF) and a 16 KiB PRG bank can fill
//! $8000-$FFFF (mask $3FFF).

use crate::bus::{Bus, BusDevice, ReadWrite};

pub struct Ram {
    min_addr: u16,
    max_addr: u16,
    mirroring_mask: u16,
    bytes: Vec<u8>,
}

impl Ram {
    /// Create a device over `[min_addr, max_addr]`. `initial` is copied to the start of the
    /// store; bytes beyond the mirrored size are dropped and unset bytes read as 0.
    pub fn new(min_addr: u16, max_addr: u16, initial: &[u8], mirroring_mask: u16) -> Self {
        let mut bytes = vec![0; mirroring_mask as usize + 1];
        let len = initial.len().min(bytes.len());
        bytes[..len].copy_from_slice(&initial[..len]);

        Self {
            min_addr,
            max_addr,
            mirroring_mask,
            bytes,
        }
    }

    /// Zero-filled device, the way system RAM starts out.
    pub fn blank(min_addr: u16, max_addr: u16, mirroring_mask: u16) -> Self {
        Self::new(min_addr, max_addr, &[], mirroring_mask)
    }

    pub fn contains(&self, addr: u16) -> bool {
        (self.min_addr..=self.max_addr).contains(&addr)
    }

    pub fn range(&self) -> (u16, u16) {
        (self.min_addr, self.max_addr)
    }

    pub fn mirroring_mask(&self) -> u16 {
        self.mirroring_mask
    }

    fn index(&self, addr: u16) -> usize {
        ((addr - self.min_addr) & self.mirroring_mask) as usize
    }

    /// Direct access for loaders and debuggers; bypasses the bus.
    pub fn peek(&self, addr: u16) -> u8 {
        if !self.contains(addr) {
            return 0;
        }
        self.bytes[self.index(addr)]
    }

    pub fn poke(&mut self, addr: u16, data: u8) {
        if self.contains(addr) {
            let index = self.index(addr);
            self.bytes[index] = data;
        }
    }
}

impl BusDevice for Ram {
    fn clock(&mut self, bus: &mut Bus) {
        let addr = bus.addr();
        if !self.contains(addr) {
            return;
        }

        let index = self.index(addr);
        match bus.rw_flag() {
            ReadWrite::Write => self.bytes[index] = bus.data(),
            ReadWrite::Read => bus.set_data(self.bytes[index]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn system_ram_mirrors_every_2k() {
        let mut bus = Bus::new();
        let mut ram = Ram::blank(0x0000, 0x1FFF, 0x07FF);

        bus.write(0x0001, 0xAB);
        ram.clock(&mut bus);

        for mirror in [0x0801, 0x1001, 0x1801] {
            bus.read(mirror);
            bus.set_data(0);
            ram.clock(&mut bus);
            assert_eq!(bus.data(), 0xAB);
        }
    }

    #[test]
    fn unwritten_bytes_read_zero() {
        let mut bus = Bus::new();
        let mut ram = Ram::blank(0x0000, 0x1FFF, 0x07FF);

        bus.write(0x0300, 0x55);
        bus.read(0x0200);
        ram.clock(&mut bus);
        assert_eq!(bus.data(), 0x00);
    }

    #[test]
    fn initial_bytes_are_readable_through_mirror() {
        let mut bus = Bus::new();
        let mut rom = Ram::new(0x8000, 0xFFFF, &[0x4C, 0x00, 0xC0], 0x3FFF);

        bus.read(0xC001);
        rom.clock(&mut bus);
        assert_eq!(bus.data(), 0x00);

        bus.read(0xC000);
        rom.clock(&mut bus);
        assert_eq!(bus.data(), 0x4C);
    }

    #[test]
    fn oversized_initial_data_is_truncated() {
        let rom = Ram::new(0x7000, 0x71FF, &[0xEE; 0x300], 0x01FF);
        assert_eq!(rom.peek(0x71FF), 0xEE);
        assert_eq!(rom.peek(0x7200), 0x00);
    }

    proptest! {
        #[test]
        fn out_of_range_access_leaves_bus_untouched(addr in 0x2000u16..=0xFFFF, data in any::<u8>(), write in any::<bool>()) {
            let mut bus = Bus::new();
            let mut ram = Ram::blank(0x0000, 0x1FFF, 0x07FF);
            if write {
                bus.write(addr, data);
            } else {
                bus.set_data(data);
                bus.read(addr);
            }
            let before = (bus.addr(), bus.data(), bus.rw_flag(), bus.serial());

            ram.clock(&mut bus);

            prop_assert_eq!((bus.addr(), bus.data(), bus.rw_flag(), bus.serial()), before);
        }

        #[test]
        fn write_then_read_round_trips(addr in 0x0000u16..=0x1FFF, data in any::<u8>()) {
            let mut bus = Bus::new();
            let mut ram = Ram::blank(0x0000, 0x1FFF, 0x07FF);

            bus.write(addr, data);
            ram.clock(&mut bus);
            bus.set_data(!data);
            bus.read(addr);
            ram.clock(&mut bus);

            prop_assert_eq!(bus.data(), data);
        }
    }
}
