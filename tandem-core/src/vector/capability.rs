use core::fmt::{self, Write};

use log::{info, warn};
use tandem_io::{VType, VectorUnit};

/// Element configurations listed by [`report`].
pub const REPORT_CONFIGS: [VType; 4] = [VType::E8M1, VType::E32M1, VType::E32M4, VType::E64M1];

/// Requested count for the VL probe; large enough to saturate any VLMAX above.
const REPORT_AVL: usize = 1024;

/// Read-only facts about the vector register file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VectorContext {
    vlenb: usize,
}

impl VectorContext {
    pub const fn from_vlenb(vlenb: usize) -> Self {
        Self { vlenb }
    }

    /// Register width in bits.
    pub const fn vlen(&self) -> usize {
        self.vlenb * 8
    }

    /// Register width in bytes.
    pub const fn vlenb(&self) -> usize {
        self.vlenb
    }
}

/// A unit whose `misa.V` bit is set but which has not been switched on yet.
pub struct DetectedVector<V> {
    unit: V,
}

/// An enabled unit. Every kernel takes one of these, so no kernel can run on
/// a unit that would still trap.
pub struct ActiveVector<V> {
    unit: V,
    context: VectorContext,
}

/// Checks the capability bit. `None` means the vector phase must be skipped.
pub fn detect<V: VectorUnit>(unit: V) -> Option<DetectedVector<V>> {
    if unit.detect() {
        info!("vector extension present");
        Some(DetectedVector { unit })
    } else {
        warn!("vector extension absent, skipping vector phase");
        None
    }
}

impl<V: VectorUnit> DetectedVector<V> {
    /// Sets `mstatus.VS` to Initial and reads VLENB.
    ///
    /// Consumes the detection token, so enable happens exactly once.
    pub fn enable(self) -> ActiveVector<V> {
        self.unit.enable();
        let context = VectorContext::from_vlenb(self.unit.vlenb());
        info!("vector unit enabled, VLEN = {} bits", context.vlen());
        ActiveVector { unit: self.unit, context }
    }
}

impl<V: VectorUnit> ActiveVector<V> {
    pub fn context(&self) -> VectorContext {
        self.context
    }

    pub fn unit(&self) -> &V {
        &self.unit
    }

    /// VL the hardware grants for `avl` elements under `vtype`.
    ///
    /// Asked afresh on every call; VL depends on the element configuration
    /// active at the time.
    pub fn granted_vl(&self, avl: usize, vtype: VType) -> usize {
        self.unit.set_vl(avl, vtype)
    }
}

/// Prints the capability block: availability, VLEN, VLENB, and the VL granted
/// for each of [`REPORT_CONFIGS`].
pub fn report<V: VectorUnit, W: Write>(
    vector: Option<&ActiveVector<V>>,
    out: &mut W,
) -> fmt::Result {
    let Some(active) = vector else {
        return writeln!(out, "[RVV] Not available (misa V-bit not set)");
    };
    let context = active.context();
    writeln!(out, "[RVV] Available")?;
    writeln!(out, "[RVV] VLEN  = {} bits", context.vlen())?;
    writeln!(out, "[RVV] VLENB = {} bytes", context.vlenb())?;
    for vtype in REPORT_CONFIGS {
        let vl = active.granted_vl(REPORT_AVL, vtype);
        let pad = 11usize.saturating_sub(label_width(vtype));
        writeln!(out, "[RVV] VL({}){:pad$} = {}", vtype, "", vl, pad = pad)?;
    }
    Ok(())
}

/// Width of `VL(<vtype>)` as printed.
fn label_width(vtype: VType) -> usize {
    4 + digits(vtype.sew.bits()) + 2 + digits(vtype.lmul.factor()) + 1
}

fn digits(mut n: usize) -> usize {
    let mut d = 1;
    while n >= 10 {
        n /= 10;
        d += 1;
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_io::EmulatedVector;

    #[test]
    fn test_absent_unit_is_not_detected() {
        assert!(detect(EmulatedVector::absent()).is_none());

        let mut out = String::new();
        report::<EmulatedVector, _>(None, &mut out).unwrap();
        assert_eq!(out, "[RVV] Not available (misa V-bit not set)\n");
    }

    #[test]
    fn test_enable_reads_register_width() {
        let unit = EmulatedVector::new(256).unwrap();
        let active = detect(&unit).unwrap().enable();
        assert!(unit.is_enabled());
        assert_eq!(active.context().vlen(), 256);
        assert_eq!(active.context().vlenb(), 32);
        assert_eq!(active.granted_vl(1024, VType::E32M4), 32);
        assert_eq!(active.granted_vl(3, VType::E32M1), 3);
    }

    #[test]
    fn test_report_lines() {
        let active = detect(EmulatedVector::new(128).unwrap()).unwrap().enable();
        let mut out = String::new();
        report(Some(&active), &mut out).unwrap();
        let expected = "\
[RVV] Available
[RVV] VLEN  = 128 bits
[RVV] VLENB = 16 bytes
[RVV] VL(e8,m1)   = 16
[RVV] VL(e32,m1)  = 4
[RVV] VL(e32,m4)  = 16
[RVV] VL(e64,m1)  = 2
";
        assert_eq!(out, expected);
    }
}
