use thiserror::Error;

use crate::models::pool::PoolKind;

/// Error taxonomy for the routing core.
///
/// Structural variants indicate an implementation bug and always propagate.
/// Domain variants are returned to the immediate caller of a pool simulation;
/// the split optimizer absorbs them as zero output for the failing allocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    #[error("sorted pools length ({sorted_pools}) does not match pools used length ({pools_used})")]
    SortedPoolsAndPoolsUsedLengthMismatch {
        sorted_pools: usize,
        pools_used: usize,
    },

    #[error("route has more pools ({pools_in_route}) than the sorted pool set ({sorted_pools})")]
    SortedPoolsAndPoolsInRouteLengthMismatch {
        sorted_pools: usize,
        pools_in_route: usize,
    },

    #[error("route {route_index} has no pools")]
    NoPoolsInRoute { route_index: usize },

    #[error("previous token out denom {previous_token_out_denom} not found in pool {pool_id} of route {route_index}")]
    PreviousTokenOutNotInPool {
        route_index: usize,
        pool_id: u64,
        previous_token_out_denom: String,
    },

    #[error("token out denom {token_out_denom} not found in pool {pool_id} of route {route_index}")]
    CurrentTokenOutNotInPool {
        route_index: usize,
        pool_id: u64,
        token_out_denom: String,
    },

    #[error("final token out denom mismatch between routes ({token_out_a} vs {token_out_b})")]
    TokenOutMismatchBetweenRoutes {
        token_out_a: String,
        token_out_b: String,
    },

    #[error("token out denom {denom} matches token in denom")]
    TokenOutMatchesTokenIn { denom: String },

    #[error("route {route_index} carries token in denom in intermediary pool {pool_id}")]
    RoutePoolWithTokenInDenom { route_index: usize, pool_id: u64 },

    #[error("route {route_index} carries final token out denom in intermediary pool {pool_id}")]
    RoutePoolWithTokenOutDenom { route_index: usize, pool_id: u64 },

    #[error("pool {pool_id} appears more than once in route {route_index}")]
    DuplicatePoolInRoute { route_index: usize, pool_id: u64 },

    #[error("no routes were provided")]
    NoRoutesProvided,

    #[error("no route produced a quote")]
    NoQuotableRoutes,

    #[error("best we can do is no tokens out")]
    NoTokensOut,

    #[error("pool {pool_id} not found")]
    PoolNotFound { pool_id: u64 },

    #[error("custom route pool {pool_id} at position {position} shares no denom with the next pool")]
    CustomRouteNotConnected { position: usize, pool_id: u64 },

    #[error("custom route over pools {pool_ids:?} is not a valid route")]
    CustomRouteInvalid { pool_ids: Vec<u64> },

    #[error("route cache is disabled")]
    RouteCacheDisabled,

    #[error("denom {denom} not found in pool {pool_id}")]
    DenomNotInPool { pool_id: u64, denom: String },

    #[error("pool {pool_id} has empty reserves")]
    EmptyPoolReserves { pool_id: u64 },

    #[error("pool type {kind} of pool {pool_id} does not support routing")]
    UnsupportedPoolType { pool_id: u64, kind: PoolKind },

    #[error("pool {pool_id} is a serialized result pool and does not support swap simulation")]
    SwapNotSupported { pool_id: u64 },

    #[error("transmuter pool {pool_id} has insufficient balance of {denom}: {balance} < {amount}")]
    TransmuterInsufficientBalance {
        pool_id: u64,
        denom: String,
        balance: u128,
        amount: u128,
    },

    #[error("concentrated pool {pool_id} has no tick model")]
    ConcentratedNoTickModel { pool_id: u64 },

    #[error("concentrated pool {pool_id} has no liquidity")]
    ConcentratedNoLiquidity { pool_id: u64 },

    #[error("concentrated pool {pool_id} current bucket index {bucket_index} is outside {total_buckets} buckets")]
    ConcentratedCurrentBucketOutOfRange {
        pool_id: u64,
        bucket_index: i64,
        total_buckets: usize,
    },

    #[error("concentrated pool {pool_id} current tick {current_tick} is outside bucket [{lower_tick}, {upper_tick})")]
    ConcentratedTickAndBucketMismatch {
        pool_id: u64,
        current_tick: i64,
        lower_tick: i64,
        upper_tick: i64,
    },

    #[error("concentrated pool {pool_id} has a zero current sqrt price")]
    ConcentratedZeroCurrentSqrtPrice { pool_id: u64 },

    #[error("concentrated pool {pool_id} has insufficient liquidity to swap {amount_in}")]
    ConcentratedInsufficientLiquidity { pool_id: u64, amount_in: u128 },

    #[error("tick {tick} is outside the supported tick range")]
    TickOutOfRange { tick: i64 },

    #[error("amount {amount} exceeds the representable fixed-point range")]
    AmountOutOfRange { amount: u128 },

    #[error("taker fee not found for denom pair ({denom0}, {denom1})")]
    TakerFeeNotFound { denom0: String, denom1: String },

    #[error("max split iterations must be at least 2, was {value}")]
    MaxSplitIterationsTooLow { value: usize },

    #[error("split route has mismatched zero amounts (in: {amount_in}, out: {amount_out})")]
    SplitInvariantViolation { amount_in: u128, amount_out: u128 },

    #[error("quote computation exceeded the {timeout_ms}ms deadline")]
    QuoteTimeout { timeout_ms: u64 },

    #[error("internal error: {message}")]
    Internal { message: String },
}

pub type RouterResult<T> = Result<T, RouterError>;
