/// PCG-RXS-M-XS 32-bit hash. Mirrored in `shaders/common.wgsl`; both sides
/// must produce the same bits for the same input.
#[inline]
pub fn pcg_hash(input: u32) -> u32 {
    let state = input.wrapping_mul(747_796_405).wrapping_add(2_891_336_453);
    let word = ((state >> ((state >> 28) + 4)) ^ state).wrapping_mul(277_803_737);
    (word >> 22) ^ word
}

/// Coin flip used when an agent's left and right probes read the same.
///
/// Mixes the per-frame seed with the agent's slot so no agent repeats the
/// same outcome every frame. `true` means turn left.
#[inline]
pub fn tie_break(frame_seed: u32, agent_index: u32) -> bool {
    pcg_hash(frame_seed ^ pcg_hash(agent_index)) & 1 == 1
}
