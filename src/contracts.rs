//! Solidity ABI bindings for the contracts this tool deploys and drives.
//!
//! Only the calls and events used by the orchestrator are declared. Calldata
//! is built with [`alloy_sol_types::SolCall`] and submitted through the
//! [`ChainClient`](crate::port::outbound::chain::ChainClient) port, so the
//! bindings carry no transport.

use alloy_sol_types::sol;

sol! {
    /// Display metadata of a liquidity-provider instance.
    struct LPMeta {
        string lpName;
        string tag;
    }

    /// Operating parameters of a liquidity-provider instance.
    struct LPConfig {
        address market;
        uint16 utilizationTargetBPS;
        uint16 rebalanceBPS;
        uint256 rebalanceCheckingInterval;
        uint256 settleCheckingInterval;
        uint256 automationFeeReserved;
        uint256 minHoldingValueToRebalance;
    }

    /// Parameters of a fundraising round.
    struct BPConfig {
        address lp;
        uint256 totalReward;
        uint256 minRaisingTarget;
        uint256 maxRaisingTarget;
        uint256 startTimeOfWarmup;
        uint256 maxDurationOfWarmup;
        uint256 durationOfLockup;
        uint256 minDeposit;
    }

    interface ILPRegistry {
        event LPRegistered(address indexed market, address indexed lp);
        event LPUnregistered(address indexed market, address indexed lp);

        function register(address lp) external;
        function unregister(address lp) external;
        function lpListByMarket(address market) external view returns (address[] memory);
    }

    interface ILP {
        function market() external view returns (address);
        function settlementToken() external view returns (address);
        function lpName() external view returns (string memory);
        function lpTag() external view returns (string memory);
        function balanceOf(address account) external view returns (uint256);
        function addLiquidity(uint256 amount, address recipient) external;
        function removeLiquidity(uint256 lpTokenAmount, address recipient) external;
        function createRebalanceTask() external;
        function cancelRebalanceTask() external;
    }

    interface IBPFactory {
        event BPCreated(address indexed lp, address bp);

        function createBP(BPConfig config) external returns (address);
    }

    interface IERC20Metadata {
        function symbol() external view returns (string memory);
        function decimals() external view returns (uint8);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }

    interface IMarketFactory {
        function registeredSettlementTokens() external view returns (address[] memory);
        function getMarketsBySettlmentToken(address settlementToken) external view returns (address[] memory);
    }

    interface IAutomationRegistry {
        function addWhitelistedRegistrar(address registrar) external;
        function isWhitelistedRegistrar(address registrar) external view returns (bool);
    }
}
