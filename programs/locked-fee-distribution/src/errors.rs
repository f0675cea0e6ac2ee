use anchor_lang::prelude::*;

#[error_code]
pub enum ErrorCode {
    #[msg("Foreign asset fees detected - only the designated asset may be distributed")]
    BaseFeesNotAllowed,
    #[msg("Invalid pool configuration - baseline and investor count must be non-zero")]
    InvalidPoolConfiguration,
    #[msg("Asset configuration mismatch - account does not hold the designated asset")]
    InvalidAssetConfiguration,
    #[msg("Cannot distribute - clock is earlier than the current window start")]
    TooSoonToDistribute,
    #[msg("Distribution for this window already completed")]
    DayAlreadyCompleted,
    #[msg("Pagination cursor out of bounds")]
    InvalidPaginationCursor,
    #[msg("Arithmetic overflow in fee calculation")]
    ArithmeticOverflow,
    #[msg("Every lock source reports an empty allocation - no locked tokens")]
    NoLockedTokens,
    #[msg("Invalid page size - must be between 1 and 50 and match the supplied investors")]
    InvalidPageSize,
    #[msg("Daily distribution cap exhausted")]
    DailyCapExceeded,
    #[msg("Lock stream account invalid or inconsistent with the window snapshot")]
    InvalidStreamAccount,
    #[msg("Investor token account does not hold the designated asset")]
    InvalidInvestorATA,
    #[msg("Not the first page of the window - cannot claim fees")]
    NotFirstPage,
    #[msg("Page does not start at the persisted cursor")]
    PaginationNotSequential,
    #[msg("Invalid basis points value - must be <= 10000")]
    InvalidBasisPoints,
    #[msg("A distribution window is still in progress")]
    WindowInProgress,
    #[msg("No dust available to sweep")]
    NoDustToSweep,
    #[msg("Investors must be supplied in strictly increasing lock source order")]
    InvestorsNotOrdered,
    #[msg("Foreign inbox is empty - nothing to recover")]
    NoForeignFees,
}
