//! ABI definitions for the contracts the swapper calls
#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use alloy::sol;

sol! {
    #[derive(Debug)]
    interface IERC20 {
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 value) external returns (bool);
    }
}

// From the Liquidity Book v2.1 periphery, `LBQuoter.sol`
sol! {
    #[derive(Debug)]
    interface ILBQuoter {
        struct Quote {
            address[] route;
            address[] pairs;
            uint256[] binSteps;
            uint8[] versions;
            uint128[] amounts;
            uint128[] virtualAmountsWithoutSlippage;
            uint128[] fees;
        }

        function findBestPathFromAmountIn(address[] calldata route, uint128 amountIn)
            external
            view
            returns (Quote memory quote);

        function findBestPathFromAmountOut(address[] calldata route, uint128 amountOut)
            external
            view
            returns (Quote memory quote);
    }
}

// From the Liquidity Book v2.1 periphery, `ILBRouter.sol`. `versions` is the
// `Version` enum, which is ABI-encoded as `uint8`
sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface ILBRouter {
        struct Path {
            uint256[] pairBinSteps;
            uint8[] versions;
            address[] tokenPath;
        }

        function swapExactTokensForTokens(
            uint256 amountIn,
            uint256 amountOutMin,
            Path memory path,
            address to,
            uint256 deadline
        ) external returns (uint256 amountOut);

        function swapExactTokensForNATIVE(
            uint256 amountIn,
            uint256 amountOutMinNATIVE,
            Path memory path,
            address payable to,
            uint256 deadline
        ) external returns (uint256 amountOut);

        function swapExactNATIVEForTokens(
            uint256 amountOutMin,
            Path memory path,
            address to,
            uint256 deadline
        ) external payable returns (uint256 amountOut);

        function swapTokensForExactTokens(
            uint256 amountOut,
            uint256 amountInMax,
            Path memory path,
            address to,
            uint256 deadline
        ) external returns (uint256[] memory amountsIn);

        function swapTokensForExactNATIVE(
            uint256 amountNATIVEOut,
            uint256 amountInMax,
            Path memory path,
            address payable to,
            uint256 deadline
        ) external returns (uint256[] memory amountsIn);

        function swapNATIVEForExactTokens(
            uint256 amountOut,
            Path memory path,
            address to,
            uint256 deadline
        ) external payable returns (uint256[] memory amountsIn);

        function swapExactTokensForTokensSupportingFeeOnTransferTokens(
            uint256 amountIn,
            uint256 amountOutMin,
            Path memory path,
            address to,
            uint256 deadline
        ) external returns (uint256 amountOut);

        function swapExactTokensForNATIVESupportingFeeOnTransferTokens(
            uint256 amountIn,
            uint256 amountOutMinNATIVE,
            Path memory path,
            address payable to,
            uint256 deadline
        ) external returns (uint256 amountOut);

        function swapExactNATIVEForTokensSupportingFeeOnTransferTokens(
            uint256 amountOutMin,
            Path memory path,
            address to,
            uint256 deadline
        ) external payable returns (uint256 amountOut);
    }
}
