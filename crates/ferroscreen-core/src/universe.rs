//! Built-in ticker lists.

/// Nifty 50 constituents (NSE, Yahoo `.NS` suffix).
pub const NIFTY_50: [&str; 50] = [
    "RELIANCE.NS", "TCS.NS", "INFY.NS", "HDFCBANK.NS", "ICICIBANK.NS",
    "KOTAKBANK.NS", "LT.NS", "SBIN.NS", "AXISBANK.NS", "HCLTECH.NS",
    "ITC.NS", "HINDUNILVR.NS", "BHARTIARTL.NS", "ASIANPAINT.NS", "TITAN.NS",
    "ULTRACEMCO.NS", "BAJFINANCE.NS", "MARUTI.NS", "NESTLEIND.NS", "WIPRO.NS",
    "SUNPHARMA.NS", "ONGC.NS", "COALINDIA.NS", "TECHM.NS", "POWERGRID.NS",
    "NTPC.NS", "TATAMOTORS.NS", "JSWSTEEL.NS", "ADANIENT.NS", "BAJAJ-AUTO.NS",
    "EICHERMOT.NS", "HEROMOTOCO.NS", "M&M.NS", "HINDALCO.NS", "BPCL.NS",
    "BRITANNIA.NS", "GRASIM.NS", "TATASTEEL.NS", "INDUSINDBK.NS", "DIVISLAB.NS",
    "CIPLA.NS", "BAJAJFINSV.NS", "SBILIFE.NS", "HDFCLIFE.NS", "SHREECEM.NS",
    "DRREDDY.NS", "ADANIPORTS.NS", "TATACONSUM.NS", "UPL.NS", "ICICIPRULI.NS",
];

/// Starting watchlist for the `screen` command.
pub const DEFAULT_WATCHLIST: [&str; 5] = [
    "TCS.NS",
    "INFY.NS",
    "WIPRO.NS",
    "HDFCBANK.NS",
    "RELIANCE.NS",
];

pub fn to_owned_list(tickers: &[&str]) -> Vec<String> {
    tickers.iter().map(|ticker| (*ticker).to_owned()).collect()
}
