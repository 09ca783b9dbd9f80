//! x86 instruction encodings used for rerouting

use crate::addr::Addr;

/// `jmp rel32` opcode byte
pub const JMP_REL32_OPCODE: u8 = 0xE9;

/// Encoded size of `jmp rel32` in bytes
pub const JMP_REL32_LEN: usize = 5;

/// Generates a relative near jump from `site` to `target` and returns its
/// bytecode.
///
/// The displacement is relative to the byte following the jump, so it is
/// `target - site - 5`, computed with 32-bit wraparound arithmetic. That
/// matches two's-complement instruction-pointer-relative addressing whether
/// the jump lands forward or backward, and every displacement fits in
/// 32 signed bits inside a 32-bit address space, so there is no range check.
pub fn jmp_rel32(site: Addr, target: Addr) -> [u8; JMP_REL32_LEN] {
    let displacement = target
        .value()
        .wrapping_sub(site.value())
        .wrapping_sub(JMP_REL32_LEN as u32);

    let mut code = [0u8; JMP_REL32_LEN];
    code[0] = JMP_REL32_OPCODE;
    code[1..].copy_from_slice(&displacement.to_le_bytes());
    code
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// Known-answer vector for a forward jump
    fn encodes_forward_jump() {
        let code = jmp_rel32(Addr::new(0x0040_1000), Addr::new(0x1000_0000));
        assert_eq!(code, [0xE9, 0xFB, 0xEF, 0xBF, 0x0F]);
    }

    #[test]
    /// A backward jump encodes as a negative two's-complement displacement
    fn encodes_backward_jump() {
        let code = jmp_rel32(Addr::new(0x1000_0000), Addr::new(0x0040_1000));
        assert_eq!(code[0], JMP_REL32_OPCODE);

        let displacement = i32::from_le_bytes(code[1..].try_into().unwrap());
        assert_eq!(i64::from(displacement), 0x0040_1000i64 - 0x1000_0000 - 5);
    }

    #[test]
    /// Bytes 1..5 always read back little-endian as `target - site - 5`
    fn displacement_reads_back() {
        let cases = [
            (0x0040_1000u32, 0x1000_0000u32),
            (0x7FFF_0000, 0x7FFF_0005),
            (0x0000_0000, 0xFFFF_FFFB),
            (0xFFFF_FFFB, 0x0000_0000),
        ];
        for (site, target) in cases {
            let code = jmp_rel32(Addr::new(site), Addr::new(target));
            let displacement = u32::from_le_bytes(code[1..].try_into().unwrap());
            assert_eq!(displacement, target.wrapping_sub(site).wrapping_sub(5));
        }
    }

    #[test]
    /// Jumping to the byte right after the instruction is a zero displacement
    fn jump_to_next_instruction_is_zero() {
        let code = jmp_rel32(Addr::new(0x1000), Addr::new(0x1005));
        assert_eq!(code, [0xE9, 0, 0, 0, 0]);
    }
}
