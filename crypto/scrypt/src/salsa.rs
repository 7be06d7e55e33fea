use crypto_common::erase::Erase;

const STATE_WORDS: usize = 16;
const DOUBLE_ROUNDS: usize = 4;

pub type Block = [u8; 64];

struct Salsa {
    state: [u32; STATE_WORDS],
} // SalsaCore<4>

impl Salsa {
    #[inline(always)]
    fn from_block(block: &Block) -> Self {
        let mut state = [0; STATE_WORDS];
        for (word, c) in state.iter_mut().zip(block.chunks_exact(4)) {
            *word = u32::from_le_bytes([c[0], c[1], c[2], c[3]]);
        }
        Self { state }
    }

    #[inline(always)]
    fn write_block(&self, block: &mut Block) {
        let mut res = run_rounds(&self.state);
        for (chunk, val) in block.chunks_exact_mut(4).zip(res.iter()) {
            chunk.copy_from_slice(&val.to_le_bytes());
        }
        res.erase();
    }
}

impl Drop for Salsa {
    fn drop(&mut self) {
        self.state.erase();
    }
}

/// The Salsa20/8 core: eight rounds over sixteen little-endian words, then
/// the input added back word by word.
#[inline]
#[must_use]
pub fn salsa20_8(input: &Block) -> Block {
    let mut out = [0; 64];
    Salsa::from_block(input).write_block(&mut out);
    out
}

/// `x = salsa20_8(x ^ y)`, the step BlockMix repeats for every block.
#[inline(always)]
pub(crate) fn xor_salsa20_8(x: &mut Block, y: &[u8]) {
    debug_assert_eq!(y.len(), 64);
    for (a, b) in x.iter_mut().zip(y) {
        *a ^= b;
    }
    let salsa = Salsa::from_block(x);
    salsa.write_block(x);
}

#[inline]
const fn quarter_round(a: usize, b: usize, c: usize, d: usize, state: &mut [u32; STATE_WORDS]) {
    state[b] ^= state[a].wrapping_add(state[d]).rotate_left(7);
    state[c] ^= state[b].wrapping_add(state[a]).rotate_left(9);
    state[d] ^= state[c].wrapping_add(state[b]).rotate_left(13);
    state[a] ^= state[d].wrapping_add(state[c]).rotate_left(18);
}

#[inline(always)]
fn run_rounds(state: &[u32; STATE_WORDS]) -> [u32; STATE_WORDS] {
    let mut res = *state;
    for _ in 0..DOUBLE_ROUNDS {
        // columns
        quarter_round(0, 4, 8, 12, &mut res);
        quarter_round(5, 9, 13, 1, &mut res);
        quarter_round(10, 14, 2, 6, &mut res);
        quarter_round(15, 3, 7, 11, &mut res);
        // rows
        quarter_round(0, 1, 2, 3, &mut res);
        quarter_round(5, 6, 7, 4, &mut res);
        quarter_round(10, 11, 8, 9, &mut res);
        quarter_round(15, 12, 13, 14, &mut res);
    }
    for (s1, s0) in res.iter_mut().zip(state.iter()) {
        *s1 = s1.wrapping_add(*s0);
    }
    res
}
