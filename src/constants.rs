/// Depth of the account Merkle tree. Account indexes are TREE_DEPTH bits.
pub const TREE_DEPTH: usize = 24;

/// Bit width of a transfer amount.
pub const AMOUNT_BITS: usize = 16;

/// Bit width of an account balance. Balance range checks hold new balances
/// below 2^BALANCE_BITS after every transfer.
pub const BALANCE_BITS: usize = 128;

/// Bit length of the signed message body:
/// from_idx || to_idx || amount || nonce, each limb little-endian.
pub const MESSAGE_BITS: usize = 2 * TREE_DEPTH + AMOUNT_BITS + TREE_DEPTH;

/// Number of whitespace-separated tokens in one witness record:
/// 15 scalars followed by three sibling arrays of TREE_DEPTH each.
pub const RECORD_TOKENS: usize = 15 + 3 * TREE_DEPTH;
