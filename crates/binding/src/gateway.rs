//! Token gateway contract bindings.
//!
//! The L1 gateway escrows tokens and creates retryable tickets; the L2 gateway
//! burns tokens and sends the L2→L1 finalization message through ArbSys.

use alloy_sol_types::sol;

sol! {
    /// L1GraphTokenGateway - L1 side of the token bridge
    #[sol(rpc)]
    #[allow(clippy::too_many_arguments)]
    interface IL1GraphTokenGateway {
        /// Emitted when tokens are escrowed and a retryable ticket is created
        event DepositInitiated(
            address l1Token,
            address indexed from,
            address indexed to,
            uint256 indexed sequenceNumber,
            uint256 amount
        );

        /// Emitted when an L2→L1 transfer releases escrowed tokens
        event WithdrawalFinalized(
            address l1Token,
            address indexed from,
            address indexed to,
            uint256 indexed exitNum,
            uint256 amount
        );

        /// Escrow tokens and create a retryable ticket to the L2 gateway.
        /// `_data` is `abi.encode(uint256 maxSubmissionCost, bytes extraData)`.
        function outboundTransfer(
            address _l1Token,
            address _to,
            uint256 _amount,
            uint256 _maxGas,
            uint256 _gasPriceBid,
            bytes calldata _data
        ) external payable returns (bytes memory);

        /// Release escrowed tokens (only callable through the outbox)
        function finalizeInboundTransfer(
            address _l1Token,
            address _from,
            address _to,
            uint256 _amount,
            bytes calldata _data
        ) external payable;

        /// Calldata the L2 gateway will receive for a given transfer
        function getOutboundCalldata(
            address _l1Token,
            address _from,
            address _to,
            uint256 _amount,
            bytes memory _data
        ) external view returns (bytes memory);

        /// Counterpart gateway on L2
        function l2Counterpart() external view returns (address);

        /// L2 token address for an L1 token (zero if unsupported)
        function calculateL2TokenAddress(address l1ERC20) external view returns (address);
    }

    /// L2GraphTokenGateway - L2 side of the token bridge
    #[sol(rpc)]
    interface IL2GraphTokenGateway {
        /// Emitted when tokens are burned and an L2→L1 message is sent
        event WithdrawalInitiated(
            address l1Token,
            address indexed from,
            address indexed to,
            uint256 indexed l2ToL1Id,
            uint256 exitNum,
            uint256 amount
        );

        /// Emitted when a retryable ticket mints tokens on L2
        event DepositFinalized(
            address indexed l1Token,
            address indexed from,
            address indexed to,
            uint256 amount
        );

        /// Burn tokens and send the finalization message to the L1 gateway
        function outboundTransfer(
            address _l1Token,
            address _to,
            uint256 _amount,
            bytes calldata _data
        ) external returns (bytes memory);

        /// Counterpart gateway on L1
        function l1Counterpart() external view returns (address);

        /// L2 token address for an L1 token (zero if unsupported)
        function calculateL2TokenAddress(address l1ERC20) external view returns (address);
    }
}
