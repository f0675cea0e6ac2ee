// PDA Seeds
pub const VAULT_SEED: &[u8] = b"vault";
pub const POLICY_SEED: &[u8] = b"policy";
pub const PROGRESS_SEED: &[u8] = b"progress";
pub const TREASURY_SEED: &[u8] = b"treasury";
pub const TREASURY_AUTHORITY_SEED: &[u8] = b"treasury_authority";
pub const FEE_INBOX_SEED: &[u8] = b"fee_inbox";
pub const FOREIGN_INBOX_SEED: &[u8] = b"foreign_inbox";

// Window timing
pub const SECONDS_PER_DAY: i64 = 86400; // 24 hours in seconds
pub const WINDOW_DURATION_SECS: i64 = SECONDS_PER_DAY;

// Fee distribution constants
pub const BASIS_POINTS_DIVISOR: u64 = 10_000;
pub const MAX_INVESTOR_SHARE_CAP_BPS: u16 = 10_000; // 100% maximum
pub const MAX_PAGE_SIZE: u8 = 50;
pub const MIN_PAGE_SIZE: u8 = 1;

// Each investor in a page is passed as (destination token account, lock stream)
pub const ACCOUNTS_PER_INVESTOR: usize = 2;

// Lock stream layout
pub const LOCK_STREAM_DISCRIMINATOR: [u8; 8] = *b"lockstrm";
